//! Log file retention management
//!
//! Keeps at most a fixed number of log files per program. The current run's
//! file is created lazily after the sweep, so a sweep leaves room for it.

use std::fs;
use std::path::{Path, PathBuf};

/// List the program's log files in `logs_dir`, oldest first
///
/// Matches names starting with `program` and ending in `.log`. File names
/// embed a sortable run stamp, so name order is age order. A missing or
/// unreadable directory yields an empty list.
pub fn list_log_files(logs_dir: &Path, program: &str) -> Vec<PathBuf> {
    let entries = match fs::read_dir(logs_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot list log directory {}: {}", logs_dir.display(), e);
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| is_program_log(name, program))
        .collect();
    names.sort();

    names.into_iter().map(|name| logs_dir.join(name)).collect()
}

fn is_program_log(name: &str, program: &str) -> bool {
    name.len() >= program.len() + ".log".len() && name.starts_with(program) && name.ends_with(".log")
}

/// Delete the oldest log files so that `keep_versions - 1` remain
///
/// Returns the paths actually deleted, in deletion order. Files that cannot be
/// removed are skipped.
pub fn cleanup_old_logs(logs_dir: &Path, program: &str, keep_versions: u8) -> Vec<PathBuf> {
    if keep_versions < 1 {
        return Vec::new();
    }

    let files = list_log_files(logs_dir, program);
    let keep = usize::from(keep_versions - 1);
    let excess = files.len().saturating_sub(keep);

    let deleted = remove_oldest(files, excess);

    tracing::debug!(
        "Retention sweep in {} kept {} of {} versions, deleted {}",
        logs_dir.display(),
        keep,
        keep_versions,
        deleted.len()
    );

    deleted
}

/// Delete the first `excess` of `files`, skipping any that cannot be removed
///
/// Returns the paths actually deleted, in order.
pub fn remove_oldest(files: Vec<PathBuf>, excess: usize) -> Vec<PathBuf> {
    let mut deleted = Vec::with_capacity(excess);
    for path in files.into_iter().take(excess) {
        match fs::remove_file(&path) {
            Ok(()) => deleted.push(path),
            Err(e) => tracing::warn!("Failed to delete old log file {}: {}", path.display(), e),
        }
    }
    deleted
}
