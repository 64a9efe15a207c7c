use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use redox_core::io::image_io::inspect_image;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let info = inspect_image(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("Color type:  {}", info.color);
    match info.bit_depth {
        Some(depth) => println!("Bit depth:   {}", depth.bits()),
        None => println!("Bit depth:   unsupported"),
    }

    Ok(())
}
