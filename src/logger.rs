//! The logger entry point and its context
//!
//! A [`LogContext`] owns the settings, the run identity, the one-time retention
//! sweep and the sink. The free functions at the crate root work on a
//! process-wide default context built on first use.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, Once, OnceLock, PoisonError};

use crate::config::{ConfigError, OutputTarget, Settings};
use crate::format;
use crate::logging::{self, RunIdentity, Sink};
use crate::value::{LogArgs, LogValue, Loggable};

/// Logger state for one program run
pub struct LogContext {
    settings: Mutex<Settings>,
    identity: RunIdentity,
    sweep: Once,
    sink: Sink,
}

impl LogContext {
    /// Context for the current process, writing to standard output
    pub fn new() -> Self {
        Self::with_parts(RunIdentity::capture(), Sink::stdout())
    }

    /// Context with an explicit identity and sink
    pub fn with_parts(identity: RunIdentity, sink: Sink) -> Self {
        Self {
            settings: Mutex::new(Settings::default()),
            identity,
            sweep: Once::new(),
            sink,
        }
    }

    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Snapshot of the current settings
    pub fn settings(&self) -> Settings {
        self.lock_settings().clone()
    }

    /// Path of this run's log file in the configured directory
    pub fn log_file_path(&self) -> PathBuf {
        self.identity.log_file_path(&self.lock_settings().directory)
    }

    /// Whether the retention sweep has already run
    pub fn has_swept(&self) -> bool {
        self.sweep.is_completed()
    }

    /// Log one value and hand it back unchanged
    pub fn log<T: Loggable>(&self, value: T) -> T {
        self.emit(|| vec![value.to_log_value()]);
        value
    }

    /// Log each element of a tuple in order and hand the tuple back
    pub fn log_args<A: LogArgs>(&self, args: A) -> A {
        self.emit(|| args.to_log_values());
        args
    }

    /// Log each value in order and hand them all back
    pub fn log_all<T: Loggable>(&self, values: Vec<T>) -> Vec<T> {
        self.emit(|| values.iter().map(Loggable::to_log_value).collect());
        values
    }

    pub fn enable_logging(&self) {
        self.lock_settings().enabled = true;
    }

    pub fn disable_logging(&self) {
        self.lock_settings().enabled = false;
    }

    pub fn set_output_to_file(&self) {
        self.lock_settings().output_target = OutputTarget::File;
    }

    pub fn set_output_to_screen(&self) {
        self.lock_settings().output_target = OutputTarget::Screen;
    }

    /// Put log files in `path`; ignored unless it is an existing directory
    pub fn set_directory(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let result = self.lock_settings().set_directory(path);
        trace_rejected(result)
    }

    /// Keep `count` log files per program; ignored outside 1..=99
    pub fn set_keep_versions(&self, count: i64) -> Result<(), ConfigError> {
        let result = self.lock_settings().set_keep_versions(count);
        trace_rejected(result)
    }

    pub fn set_timestamps(&self, enabled: bool) {
        self.lock_settings().timestamps = enabled;
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.lock_settings().prefix = prefix.into();
    }

    pub fn set_suffix(&self, suffix: impl Into<String>) {
        self.lock_settings().suffix = suffix.into();
    }

    fn lock_settings(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the sweep if needed, then render and write the values
    ///
    /// Values are only built when logging is enabled.
    fn emit(&self, values: impl FnOnce() -> Vec<LogValue>) {
        self.sweep_once();

        let settings = self.settings();
        if !settings.enabled {
            return;
        }

        let log_file = self.identity.log_file_path(&settings.directory);
        for value in values() {
            self.write_record(&settings, &log_file, &value);
        }
    }

    fn sweep_once(&self) {
        self.sweep.call_once(|| {
            let settings = self.settings();
            let deleted = logging::cleanup_old_logs(
                &settings.directory,
                &self.identity.program,
                settings.keep_versions,
            );
            if !settings.enabled {
                return;
            }

            let log_file = self.identity.log_file_path(&settings.directory);
            for path in deleted {
                let notice = format!("LOGGER: Deleted old log file {}", path.display());
                self.write_record(&settings, &log_file, &LogValue::Text(notice));
            }
        });
    }

    fn write_record(&self, settings: &Settings, log_file: &Path, value: &LogValue) {
        let line = decorate(settings, &format::render(value));
        self.sink.write_line(settings.output_target, log_file, &line);
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new()
    }
}

/// `[timestamp] prefix rendered suffix`, with no separators
pub fn decorate(settings: &Settings, rendered: &str) -> String {
    let stamp = if settings.timestamps {
        logging::timestamp()
    } else {
        String::new()
    };
    format!("{}{}{}{}", stamp, settings.prefix, rendered, settings.suffix)
}

fn trace_rejected(result: Result<(), ConfigError>) -> Result<(), ConfigError> {
    if let Err(e) = &result {
        tracing::debug!("Ignoring logger setting: {}", e);
    }
    result
}

static DEFAULT_CONTEXT: OnceLock<LogContext> = OnceLock::new();

/// The process-wide context used by the crate-level functions
pub fn default_context() -> &'static LogContext {
    DEFAULT_CONTEXT.get_or_init(LogContext::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryWriter;
    use std::collections::BTreeMap;
    use std::fs::File;
    use tempfile::TempDir;

    const STAMP: &str = "20260121-143045+0000";

    fn test_context() -> (LogContext, MemoryWriter) {
        let screen = MemoryWriter::new();
        let context = LogContext::with_parts(
            RunIdentity::new("app", STAMP),
            Sink::with_screen(screen.clone()),
        );
        (context, screen)
    }

    /// Context logging into an empty temporary directory
    fn dir_context() -> (LogContext, MemoryWriter, TempDir) {
        let (context, screen) = test_context();
        let temp_dir = TempDir::new().unwrap();
        context.set_directory(temp_dir.path()).unwrap();
        (context, screen, temp_dir)
    }

    fn old_logs(dir: &Path, count: usize) -> Vec<PathBuf> {
        (1..=count)
            .map(|day| {
                let path = dir.join(format!("app-202601{:02}-120000+0000.log", day));
                File::create(&path).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_log_returns_value() {
        let (context, _screen, _dir) = dir_context();

        assert_eq!(context.log(42), 42);
        assert_eq!(context.log(String::from("owned")), "owned");
        assert_eq!(context.log(vec![1, 2, 3]), vec![1, 2, 3]);
        assert_eq!(context.log(None::<u8>), None);
        assert_eq!(context.log(2.5), 2.5);
    }

    #[test]
    fn test_log_args_returns_tuple() {
        let (context, screen, _dir) = dir_context();

        let (a, b, c) = context.log_args((1, "two", false));
        assert_eq!((a, b, c), (1, "two", false));
        assert_eq!(screen.lines(), vec![">>>1", ">>>two", ">>>false"]);
    }

    #[test]
    fn test_log_all_returns_values_in_order() {
        let (context, screen, _dir) = dir_context();

        let values = context.log_all(vec!["a", "b"]);
        assert_eq!(values, vec!["a", "b"]);
        assert_eq!(screen.lines(), vec![">>>a", ">>>b"]);
    }

    #[test]
    fn test_empty_args_write_nothing() {
        let (context, screen, _dir) = dir_context();

        context.log_args(());
        assert!(screen.contents().is_empty());
        assert!(context.has_swept());
    }

    #[test]
    fn test_boolean_and_null_records() {
        let (context, screen, _dir) = dir_context();

        context.log(true);
        context.log(false);
        context.log(None::<String>);
        assert_eq!(screen.contents(), ">>>true\n>>>false\n>>>NULL\n");
    }

    #[test]
    fn test_json_string_record() {
        let (context, screen, _dir) = dir_context();

        let returned = context.log(r#"{"a":1}"#);
        assert_eq!(returned, r#"{"a":1}"#);
        assert_eq!(screen.contents(), ">>>JSON Map\n(\n    [a] => 1\n)\n");
    }

    #[test]
    fn test_invalid_json_record_is_literal() {
        let (context, screen, _dir) = dir_context();

        context.log("{not valid json}");
        assert_eq!(screen.contents(), ">>>{not valid json}\n");
    }

    #[test]
    fn test_container_record() {
        let (context, screen, _dir) = dir_context();

        let mut fruit = BTreeMap::new();
        fruit.insert("apple", 3);
        fruit.insert("pear", 0);
        context.log(&fruit);

        assert_eq!(
            screen.contents(),
            ">>>Map\n(\n    [apple] => 3\n    [pear] => 0\n)\n"
        );
    }

    #[test]
    fn test_prefix_and_suffix() {
        let (context, screen, _dir) = dir_context();

        context.set_prefix("#");
        context.set_suffix("!");
        context.log("hi");
        assert_eq!(screen.contents(), "#hi!\n");
    }

    #[test]
    fn test_empty_prefix_clears_decoration() {
        let (context, screen, _dir) = dir_context();

        context.set_prefix("");
        context.log("bare");
        assert_eq!(screen.contents(), "bare\n");
    }

    #[test]
    fn test_timestamps_prepended() {
        let (context, screen, _dir) = dir_context();

        context.set_timestamps(true);
        context.log("x");

        let contents = screen.contents();
        let (stamp, rest) = contents.split_at(STAMP.len());
        assert!(stamp.starts_with(|c: char| c.is_ascii_digit()));
        assert_eq!(rest, ">>>x\n");
    }

    #[test]
    fn test_decorate_order() {
        let mut settings = Settings::default();
        settings.prefix = "[".to_string();
        settings.suffix = "]".to_string();
        assert_eq!(decorate(&settings, "body"), "[body]");
    }

    #[test]
    fn test_disabled_logging_passes_through_silently() {
        let (context, screen, _dir) = dir_context();

        context.disable_logging();
        assert_eq!(context.log("x"), "x");
        assert!(screen.contents().is_empty());

        context.enable_logging();
        context.log("y");
        assert_eq!(screen.contents(), ">>>y\n");
    }

    #[test]
    fn test_sweep_runs_even_when_disabled() {
        let (context, screen, dir) = dir_context();
        let files = old_logs(dir.path(), 2);

        context.disable_logging();
        context.log(1);

        assert!(context.has_swept());
        assert!(files.iter().all(|f| !f.exists()));
        assert!(screen.contents().is_empty());
    }

    #[test]
    fn test_retention_runs_once() {
        let (context, screen, dir) = dir_context();
        context.set_keep_versions(2).unwrap();
        let files = old_logs(dir.path(), 5);

        context.log("first");

        // Four go, leaving one old file plus the current run's
        for path in &files[..4] {
            assert!(!path.exists());
        }
        assert!(files[4].exists());

        let lines = screen.lines();
        assert_eq!(lines.len(), 5);
        for (line, path) in lines.iter().zip(&files[..4]) {
            assert_eq!(line, &format!(">>>LOGGER: Deleted old log file {}", path.display()));
        }
        assert_eq!(lines[4], ">>>first");

        let newer = old_logs(dir.path(), 3);
        context.log("second");
        assert!(newer.iter().all(|p| p.exists()));
        assert_eq!(screen.lines().len(), 6);
    }

    #[test]
    fn test_file_output() {
        let (context, screen, _dir) = dir_context();
        let log_file = context.log_file_path();

        context.set_output_to_file();
        assert!(!log_file.exists());
        context.log("to file");
        context.log(7);

        assert_eq!(std::fs::read_to_string(&log_file).unwrap(), ">>>to file\n>>>7\n");
        assert!(screen.contents().is_empty());

        context.set_output_to_screen();
        context.log("back");
        assert_eq!(screen.contents(), ">>>back\n");
    }

    #[test]
    fn test_retention_notices_go_to_log_file() {
        let (context, screen, dir) = dir_context();
        let files = old_logs(dir.path(), 1);

        context.set_output_to_file();
        context.log("after sweep");

        let written = std::fs::read_to_string(context.log_file_path()).unwrap();
        assert_eq!(
            written,
            format!(
                ">>>LOGGER: Deleted old log file {}\n>>>after sweep\n",
                files[0].display()
            )
        );
        assert!(screen.contents().is_empty());
    }

    #[test]
    fn test_log_file_name_uses_identity() {
        let (context, _screen, dir) = dir_context();
        assert_eq!(
            context.log_file_path(),
            dir.path().join(format!("app-{}.log", STAMP))
        );
    }

    #[test]
    fn test_invalid_settings_are_ignored() {
        let (context, _screen) = test_context();
        let before = context.settings();

        assert!(context.set_keep_versions(0).is_err());
        assert!(context.set_keep_versions(150).is_err());
        assert!(context.set_directory("/nonexistent").is_err());

        assert_eq!(context.settings(), before);
    }

    #[test]
    fn test_default_context_pass_through() {
        // Settings must be in place before the first call triggers the sweep
        let temp_dir = TempDir::new().unwrap();
        let stray = temp_dir
            .path()
            .join(format!("{}-20260101-120000+0000.log", default_context().identity().program));
        File::create(&stray).unwrap();
        crate::set_directory(temp_dir.path());
        crate::disable_logging();
        assert_eq!(default_context().settings().directory, temp_dir.path());

        assert_eq!(crate::log!("x"), "x");
        assert_eq!(crate::log!(1, "a", true), (1, "a", true));
        crate::log!();
        assert!(!default_context().settings().enabled);
        assert!(default_context().has_swept());
        assert!(!stray.exists());
    }
}
