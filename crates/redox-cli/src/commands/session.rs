use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use redox_core::consts::DEFAULT_SESSIONS_ROOT;
use redox_core::frame::Channel;
use redox_core::session::{sequence_index, Session};

#[derive(Clone, Copy, ValueEnum)]
pub enum ChannelArg {
    Fad,
    Nadh,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Fad => Channel::Fad,
            ChannelArg::Nadh => Channel::Nadh,
        }
    }
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Create a new timestamped session directory
    New(NewArgs),
    /// Copy images into a session's channel folder
    Add(AddArgs),
    /// List staged images and how they pair up
    List(ListArgs),
}

#[derive(Args)]
pub struct NewArgs {
    /// Directory holding all sessions
    #[arg(long, default_value = DEFAULT_SESSIONS_ROOT)]
    pub root: PathBuf,
}

#[derive(Args)]
pub struct AddArgs {
    /// Session directory
    pub session: PathBuf,

    /// Channel the images were acquired in
    #[arg(long, value_enum)]
    pub channel: ChannelArg,

    /// Image files to stage
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Session directory
    pub session: PathBuf,
}

pub fn run(cmd: &SessionCommand) -> Result<()> {
    match cmd {
        SessionCommand::New(args) => new(args),
        SessionCommand::Add(args) => add(args),
        SessionCommand::List(args) => list(args),
    }
}

fn new(args: &NewArgs) -> Result<()> {
    let session = Session::create_now(&args.root)
        .with_context(|| format!("Failed to create session under {}", args.root.display()))?;
    println!("{}", session.root().display());
    Ok(())
}

fn add(args: &AddArgs) -> Result<()> {
    let session = Session::open(&args.session)?;
    let channel = Channel::from(args.channel);

    for file in &args.files {
        let staged = session
            .stage_file(channel, file)
            .with_context(|| format!("Failed to stage {}", file.display()))?;
        println!("{channel:<5} {} -> {}", file.display(), staged.display());
    }
    Ok(())
}

fn list(args: &ListArgs) -> Result<()> {
    let session = Session::open(&args.session)?;

    for channel in Channel::ALL {
        let files = session.list_files(channel)?;
        println!("{channel} ({} files)", files.len());
        for file in &files {
            let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            match sequence_index(file) {
                Ok(index) => println!("  {:>5}  {name}", index),
                Err(_) => println!("  {:>5}  {name}", "-"),
            }
        }
    }

    let fad = session.list_files(Channel::Fad)?.len();
    let nadh = session.list_files(Channel::Nadh)?.len();
    if fad != nadh {
        println!("\nWarning: {fad} FAD and {nadh} NADH images; the run needs matching counts");
    }
    Ok(())
}
