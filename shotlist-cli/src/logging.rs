// ============================================================================
// shotlist-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and optional file logging for the CLI
//
// Without a log directory the CLI uses env_logger with a compact colored
// console format. With `--log-dir` it switches to log4rs so the same records
// also land in a timestamped file.
//
// USAGE:
// - default: info level
// - --verbose: debug level
// - SHOTLIST_LOG=<filter>: env_logger filter string, overrides both

use crate::cli_error;
use crate::error::{CliErrorContext, CliResult};
use console::style;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable holding an env_logger filter string.
pub const LOG_ENV_VAR: &str = "SHOTLIST_LOG";

const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {m}{n}";

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Log file path inside `log_dir` for a run started now.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("shotlist_{}.log", get_timestamp()))
}

/// Installs the process logger.
///
/// Returns the log file path when file logging was requested.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let level = level_for(verbose);
    match log_dir {
        None => {
            init_console(level);
            Ok(None)
        }
        Some(dir) => {
            let path = log_file_path(dir);
            init_console_and_file(&path, level)?;
            log::debug!("Logging to {}", path.display());
            Ok(Some(path))
        }
    }
}

fn init_console(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            let level_str = match record.level() {
                log::Level::Error => style("ERROR").red().bold(),
                log::Level::Warn => style("WARN ").yellow(),
                log::Level::Info => style("INFO ").green(),
                log::Level::Debug => style("DEBUG").blue(),
                log::Level::Trace => style("TRACE").magenta(),
            }
            .for_stderr();
            writeln!(buf, "{} {} {}", buf.timestamp_seconds(), level_str, record.args())
        })
        .filter_level(level);
    if let Ok(filters) = std::env::var(LOG_ENV_VAR) {
        builder.parse_filters(&filters);
    }
    // A logger installed earlier (tests) wins.
    let _ = builder.try_init();
}

fn init_console_and_file(log_file: &Path, level: LevelFilter) -> CliResult<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .cli_with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l:<5})} {m}{n}")))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(log_file)
        .cli_with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(level),
        )
        .map_err(|e| cli_error!("Invalid logging configuration: {}", e))?;

    log4rs::init_config(config).map_err(|e| cli_error!("Failed to install logger: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_shape() {
        let ts = get_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
        assert!(ts.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn log_file_named_by_timestamp() {
        let path = log_file_path(Path::new("/tmp/logs"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("shotlist_"));
        assert!(name.ends_with(".log"));
        assert_eq!(path.parent(), Some(Path::new("/tmp/logs")));
    }

    #[test]
    fn verbose_selects_debug() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }
}
