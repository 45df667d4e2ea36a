use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use taplog::{LogContext, LogValue, Number};

#[derive(Parser)]
#[command(name = "taplog")]
#[command(about = "Log values to the screen or a per-run log file", long_about = None)]
struct Cli {
    /// Write records to the run's log file instead of stdout
    #[arg(short, long)]
    file: bool,

    /// Directory for log files (must exist)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Number of log files to keep (1-99)
    #[arg(short, long, allow_negative_numbers = true)]
    keep: Option<i64>,

    /// Text printed before each record
    #[arg(long)]
    prefix: Option<String>,

    /// Text printed after each record
    #[arg(long)]
    suffix: Option<String>,

    /// Prefix each record with a date/time stamp
    #[arg(short, long)]
    timestamps: bool,

    /// Disable output (old log files are still cleaned up)
    #[arg(long)]
    off: bool,

    /// Also log each stdin line, echoing it unchanged to stdout (use with --file)
    #[arg(long)]
    stdin: bool,

    /// Values to log; true/false, null and numbers are logged as such
    values: Vec<String>,
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taplog=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let context = taplog::default_context();
    apply_settings(context, &cli);

    context.log_all(cli.values.iter().map(|v| parse_value(v)).collect());

    if cli.stdin {
        tee_stdin(context)?;
    }

    Ok(())
}

fn apply_settings(context: &LogContext, cli: &Cli) {
    if let Some(dir) = &cli.dir {
        if let Err(e) = context.set_directory(dir) {
            tracing::warn!("Keeping log directory {}: {}", context.settings().directory.display(), e);
        }
    }
    if let Some(keep) = cli.keep {
        if let Err(e) = context.set_keep_versions(keep) {
            tracing::warn!("Keeping {} log versions: {}", context.settings().keep_versions, e);
        }
    }
    if let Some(prefix) = &cli.prefix {
        context.set_prefix(prefix.as_str());
    }
    if let Some(suffix) = &cli.suffix {
        context.set_suffix(suffix.as_str());
    }
    if cli.file {
        context.set_output_to_file();
    }
    context.set_timestamps(cli.timestamps);
    if cli.off {
        context.disable_logging();
    }
}

/// Read the literal forms the shell can't type
fn parse_value(arg: &str) -> LogValue {
    match arg {
        "true" => return LogValue::Boolean(true),
        "false" => return LogValue::Boolean(false),
        "null" => return LogValue::Null,
        _ => {}
    }

    if let Ok(n) = arg.parse::<i128>() {
        return LogValue::Number(Number::Signed(n));
    }
    if arg.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(n) = arg.parse::<f64>() {
            return LogValue::Number(Number::Float(n));
        }
    }
    LogValue::Text(arg.to_string())
}

fn tee_stdin(context: &LogContext) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = context.log(line.context("Failed to read stdin")?);
        writeln!(stdout, "{}", line).context("Failed to write stdout")?;
    }

    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_literals() {
        assert_eq!(parse_value("true"), LogValue::Boolean(true));
        assert_eq!(parse_value("false"), LogValue::Boolean(false));
        assert_eq!(parse_value("null"), LogValue::Null);
    }

    #[test]
    fn test_parse_value_numbers() {
        assert_eq!(parse_value("-12"), LogValue::Number(Number::Signed(-12)));
        assert_eq!(parse_value("2.5"), LogValue::Number(Number::Float(2.5)));
    }

    #[test]
    fn test_parse_value_text() {
        assert_eq!(parse_value("inf"), LogValue::Text("inf".to_string()));
        assert_eq!(parse_value("{\"a\":1}"), LogValue::Text("{\"a\":1}".to_string()));
        assert_eq!(parse_value("hello"), LogValue::Text("hello".to_string()));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["taplog", "--file", "--keep", "3", "--prefix", "#", "a", "b"]);
        assert!(cli.file);
        assert_eq!(cli.keep, Some(3));
        assert_eq!(cli.prefix.as_deref(), Some("#"));
        assert_eq!(cli.values, vec!["a", "b"]);
    }
}
