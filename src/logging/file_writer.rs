//! Record output: the screen writer, per-run log files, and run identity
//!
//! File records are written with a fresh open/append/close cycle per line, so
//! no handle is held between calls and each line lands whole.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;

use crate::config::OutputTarget;

/// Date/time format used for run stamps and record timestamps
///
/// Sorts chronologically as text within one UTC offset.
pub const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S%z";

/// Program name used when the executable name cannot be determined
const FALLBACK_PROGRAM: &str = "taplog";

/// Current local time in [`STAMP_FORMAT`]
pub fn timestamp() -> String {
    Local::now().format(STAMP_FORMAT).to_string()
}

/// Name and start time of the running program
///
/// Together they name the run's log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentity {
    /// File stem of the running executable
    pub program: String,
    /// Time the identity was captured, in [`STAMP_FORMAT`]
    pub run_stamp: String,
}

impl RunIdentity {
    pub fn new(program: impl Into<String>, run_stamp: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            run_stamp: run_stamp.into(),
        }
    }

    /// Capture the identity of the current process
    pub fn capture() -> Self {
        Self::new(program_name(), timestamp())
    }

    /// `{program}-{run_stamp}.log`
    pub fn log_file_name(&self) -> String {
        format!("{}-{}.log", self.program, self.run_stamp)
    }

    /// Path of this run's log file inside `logs_dir`
    pub fn log_file_path(&self, logs_dir: &Path) -> PathBuf {
        logs_dir.join(self.log_file_name())
    }
}

/// File stem of the running executable
fn program_name() -> String {
    let from_args = std::env::args_os().next().map(PathBuf::from);
    let exe = from_args.or_else(|| std::env::current_exe().ok());

    exe.as_deref()
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| FALLBACK_PROGRAM.to_string())
}

/// Append one line to `path`, creating the file if needed
///
/// The handle is closed before returning.
pub fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

fn write_and_flush(writer: &mut dyn Write, record: &str) -> io::Result<()> {
    writer.write_all(record.as_bytes())?;
    writer.flush()
}

/// Destination for decorated log records
pub struct Sink {
    screen: Mutex<Box<dyn Write + Send>>,
}

impl Sink {
    /// Sink whose screen target is standard output
    pub fn stdout() -> Self {
        Self::with_screen(io::stdout())
    }

    /// Sink whose screen target is `writer`
    pub fn with_screen(writer: impl Write + Send + 'static) -> Self {
        Self {
            screen: Mutex::new(Box::new(writer)),
        }
    }

    /// Write `line` plus a newline to the target
    ///
    /// Failures are traced and the record is dropped.
    pub fn write_line(&self, target: OutputTarget, log_file: &Path, line: &str) {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');

        match target {
            OutputTarget::Screen => {
                let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
                if let Err(e) = write_and_flush(&mut **screen, &record) {
                    tracing::warn!("Dropped log record, screen write failed: {}", e);
                }
            }
            OutputTarget::File => {
                if let Err(e) = append_line(log_file, &record) {
                    tracing::warn!(
                        "Dropped log record, cannot append to {}: {}",
                        log_file.display(),
                        e
                    );
                }
            }
        }
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::stdout()
    }
}

/// In-memory writer whose contents can be read back
///
/// Clones share one buffer, so a clone handed to a [`Sink`] can be inspected
/// through the original.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Written text split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
