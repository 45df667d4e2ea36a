//! Logger settings
//!
//! All configuration is made through direct setter calls. Each setter validates
//! its input first and leaves the settings untouched when the input is invalid.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Smallest accepted number of log files to keep
pub const MIN_KEEP_VERSIONS: i64 = 1;

/// Largest accepted number of log files to keep
pub const MAX_KEEP_VERSIONS: i64 = 99;

/// Where rendered log records go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// Standard output
    #[default]
    Screen,
    /// The current run's log file
    File,
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Screen => write!(f, "screen"),
            OutputTarget::File => write!(f, "file"),
        }
    }
}

/// A rejected setting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("not an existing directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("keep versions must be between 1 and 99, got {0}")]
    KeepVersionsOutOfRange(i64),
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Whether any output happens at all
    pub enabled: bool,

    pub output_target: OutputTarget,

    /// Directory holding the log files (must exist)
    pub directory: PathBuf,

    /// Number of log files kept per program, counting the current run's
    pub keep_versions: u8,

    /// Printed before each record (default: ">>>")
    pub prefix: String,

    /// Printed after each record
    pub suffix: String,

    /// Prepend a date/time stamp to each record
    pub timestamps: bool,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_prefix() -> String {
    ">>>".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            output_target: OutputTarget::Screen,
            directory: default_directory(),
            keep_versions: 1,
            prefix: default_prefix(),
            suffix: String::new(),
            timestamps: false,
        }
    }
}

impl Settings {
    /// Point log files at `path`, expanding a leading `~`
    ///
    /// Rejected unless the expanded path is an existing directory.
    pub fn set_directory(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let directory = expand_path(path.as_ref());
        if !directory.is_dir() {
            return Err(ConfigError::InvalidDirectory(directory));
        }
        self.directory = directory;
        Ok(())
    }

    /// Set how many log files to keep, rejecting counts outside 1..=99
    pub fn set_keep_versions(&mut self, count: i64) -> Result<(), ConfigError> {
        let count = u8::try_from(count)
            .ok()
            .filter(|n| (MIN_KEEP_VERSIONS..=MAX_KEEP_VERSIONS).contains(&i64::from(*n)))
            .ok_or(ConfigError::KeepVersionsOutOfRange(count))?;
        self.keep_versions = count;
        Ok(())
    }
}

/// Expand `~` in a user-supplied path
fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}
