//! On-disk acquisition sessions.
//!
//! A session is a timestamp-named directory holding one sub-folder per
//! channel and a `results` folder:
//!
//! ```text
//! <sessions-root>/2024-03-01_14-05-59/
//!     FAD/      cells_1.tif  cells_2.tif ...
//!     NADH/     cells_1.tif  cells_2.tif ...
//!     results/  redox_image_0_NADH_div_FAD.tif ...
//!     redox_summary.csv
//! ```
//!
//! Files are paired across channels by the last integer in their file stem.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::consts::{RESULTS_DIR, SESSION_TIMESTAMP_FORMAT, SUMMARY_FILE};
use crate::error::{RedoxError, Result};
use crate::frame::Channel;

/// What to do when the two channels hold a different number of files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingPolicy {
    /// Refuse to run.
    #[default]
    Strict,
    /// Pair up to the shorter list and ignore the rest.
    Truncate,
}

impl std::fmt::Display for PairingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "Strict"),
            Self::Truncate => write!(f, "Truncate"),
        }
    }
}

/// Handle to one session directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    root: PathBuf,
}

/// FAD and NADH files that make up one acquisition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePair {
    pub index: usize,
    pub fad: PathBuf,
    pub nadh: PathBuf,
}

/// A submitted session: its pairs, sorted and matched, ready for the driver.
#[derive(Clone, Debug)]
pub struct SessionPlan {
    pub session: Session,
    pub pairs: Vec<ImagePair>,
}

impl Session {
    /// Create `<sessions_root>/<timestamp>/` with its channel and results folders.
    pub fn create(sessions_root: &Path, timestamp: NaiveDateTime) -> Result<Self> {
        let root = sessions_root.join(timestamp.format(SESSION_TIMESTAMP_FORMAT).to_string());
        let session = Self { root };
        for channel in Channel::ALL {
            create_dir(&session.channel_dir(channel))?;
        }
        create_dir(&session.results_dir())?;
        info!(path = %session.root.display(), "Created session");
        Ok(session)
    }

    /// Create a session stamped with the current local time.
    pub fn create_now(sessions_root: &Path) -> Result<Self> {
        Self::create(sessions_root, Local::now().naive_local())
    }

    /// Reopen an existing session directory.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(RedoxError::fs(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "session directory not found"),
            ));
        }
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    /// The session under `sessions_root` with the most recent timestamp name.
    pub fn latest(sessions_root: &Path) -> Result<Option<Self>> {
        let entries = fs::read_dir(sessions_root).map_err(|e| RedoxError::fs(sessions_root, e))?;
        let mut best: Option<(NaiveDateTime, PathBuf)> = None;

        for entry in entries {
            let path = entry.map_err(|e| RedoxError::fs(sessions_root, e))?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(stamp) = parse_timestamp(&path) else {
                continue;
            };
            if best.as_ref().map_or(true, |(b, _)| stamp > *b) {
                best = Some((stamp, path));
            }
        }

        Ok(best.map(|(_, root)| Self { root }))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Timestamp encoded in the directory name, if it follows the convention.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.root)
    }

    pub fn channel_dir(&self, channel: Channel) -> PathBuf {
        self.root.join(channel.dir_name())
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join(RESULTS_DIR)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    /// Copy `source` into the channel folder as `<stem>_<n>.<ext>`.
    ///
    /// `n` counts the files already staged for the channel, starting at 1.
    pub fn stage_file(&self, channel: Channel, source: &Path) -> Result<PathBuf> {
        let dir = self.channel_dir(channel);
        create_dir(&dir)?;

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let ext = source.extension().and_then(|e| e.to_str());

        let mut counter = self.list_files(channel)?.len() + 1;
        let destination = loop {
            let name = match ext {
                Some(ext) => format!("{stem}_{counter}.{ext}"),
                None => format!("{stem}_{counter}"),
            };
            let candidate = dir.join(name);
            if !candidate.exists() {
                break candidate;
            }
            counter += 1;
        };

        fs::copy(source, &destination).map_err(|e| RedoxError::fs(source, e))?;
        debug!(
            channel = %channel,
            from = %source.display(),
            to = %destination.display(),
            "Staged file"
        );
        Ok(destination)
    }

    /// Regular, non-hidden files of a channel folder in name order.
    pub fn list_files(&self, channel: Channel) -> Result<Vec<PathBuf>> {
        let dir = self.channel_dir(channel);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| RedoxError::fs(&dir, e))? {
            let path = entry.map_err(|e| RedoxError::fs(&dir, e))?.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if path.is_file() && !hidden {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Channel files ordered by their sequence index.
    pub fn sorted_channel(&self, channel: Channel) -> Result<Vec<PathBuf>> {
        let mut keyed = self
            .list_files(channel)?
            .into_iter()
            .map(|path| sequence_index(&path).map(|idx| (idx, path)))
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by_key(|(idx, _)| *idx);
        Ok(keyed.into_iter().map(|(_, path)| path).collect())
    }

    /// Sort and pair both channels, closing the collecting phase.
    pub fn submit(&self, policy: PairingPolicy) -> Result<SessionPlan> {
        let fad = self.sorted_channel(Channel::Fad)?;
        let nadh = self.sorted_channel(Channel::Nadh)?;

        if fad.len() != nadh.len() {
            match policy {
                PairingPolicy::Strict => {
                    return Err(RedoxError::ChannelCountMismatch {
                        fad: fad.len(),
                        nadh: nadh.len(),
                    })
                }
                PairingPolicy::Truncate => warn!(
                    fad = fad.len(),
                    nadh = nadh.len(),
                    "Channel counts differ, pairing up to the shorter list"
                ),
            }
        }

        let pairs: Vec<ImagePair> = fad
            .into_iter()
            .zip(nadh)
            .enumerate()
            .map(|(index, (fad, nadh))| ImagePair { index, fad, nadh })
            .collect();
        if pairs.is_empty() {
            return Err(RedoxError::EmptySession(self.root.clone()));
        }

        Ok(SessionPlan {
            session: self.clone(),
            pairs,
        })
    }
}

/// Last run of digits in a file stem, e.g. `cells_12_3.tif` → 3.
pub fn sequence_index(path: &Path) -> Result<u64> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("digit pattern is valid"));

    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|stem| digits.find_iter(stem).last())
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| RedoxError::MissingSequenceIndex(path.to_path_buf()))
}

fn parse_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    NaiveDateTime::parse_from_str(name, SESSION_TIMESTAMP_FORMAT).ok()
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| RedoxError::fs(path, e))
}
