//! taplog - a pass-through diagnostic logger
//!
//! Log any value in the middle of an expression. The value is rendered by kind
//! (booleans, numbers, strings with JSON detection, containers as trees, opaque
//! objects and handles), written to the screen or to a per-run log file, and
//! handed back unchanged.
//!
//! ```no_run
//! taplog::set_output_to_file();
//! let total = taplog::log(2 + 2);
//! let (name, active) = taplog::log!("fruit", true);
//! ```
//!
//! Log files are named `{directory}/{program}-{YYYYMMDD-HHMMSS}{+zzzz}.log`. On
//! the first call of a run, older files of the same program are deleted so that
//! at most `keep_versions` remain once the current file is written.

pub mod config;
pub mod format;
pub mod logger;
pub mod logging;
pub mod value;

use std::path::Path;

pub use config::{ConfigError, OutputTarget, Settings};
pub use logger::{default_context, LogContext};
pub use value::{LogArgs, LogValue, Loggable, Number, Raw};

/// Log one value through the default context and return it
pub fn log<T: Loggable>(value: T) -> T {
    default_context().log(value)
}

/// Log each element of a tuple through the default context and return the tuple
pub fn log_args<A: LogArgs>(args: A) -> A {
    default_context().log_args(args)
}

/// Log each value through the default context and return them
pub fn log_all<T: Loggable>(values: Vec<T>) -> Vec<T> {
    default_context().log_all(values)
}

pub fn enable_logging() {
    default_context().enable_logging();
}

pub fn disable_logging() {
    default_context().disable_logging();
}

pub fn set_output_to_file() {
    default_context().set_output_to_file();
}

pub fn set_output_to_screen() {
    default_context().set_output_to_screen();
}

/// Put log files in `path` if it is an existing directory
pub fn set_directory(path: impl AsRef<Path>) {
    let _ = default_context().set_directory(path);
}

/// Keep `count` log files per program if 1 <= count <= 99
pub fn set_keep_versions(count: i64) {
    let _ = default_context().set_keep_versions(count);
}

pub fn set_timestamps(enabled: bool) {
    default_context().set_timestamps(enabled);
}

pub fn set_prefix(prefix: impl Into<String>) {
    default_context().set_prefix(prefix);
}

pub fn set_suffix(suffix: impl Into<String>) {
    default_context().set_suffix(suffix);
}

/// Log any number of values through the default context
///
/// Returns the value itself for one argument, a tuple of all arguments for
/// several, and `()` for none.
///
/// ```no_run
/// let n = taplog::log!(5) + 1;
/// let (a, b) = taplog::log!("a", vec![1, 2]);
/// ```
#[macro_export]
macro_rules! log {
    () => {
        $crate::log_args(())
    };
    ($value:expr $(,)?) => {
        $crate::log($value)
    };
    ($($value:expr),+ $(,)?) => {
        $crate::log_args(($($value),+))
    };
}
