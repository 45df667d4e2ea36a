//! Output plumbing for the logger
//!
//! Provides the screen/file sink, per-run log file naming, and retention of old
//! log files.

mod file_writer;
mod retention;

pub use file_writer::{append_line, timestamp, MemoryWriter, RunIdentity, Sink, STAMP_FORMAT};
pub use retention::{cleanup_old_logs, list_log_files, remove_oldest};
