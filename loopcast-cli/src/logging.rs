// ============================================================================
// loopcast-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and Optional File Logging
//
// The core only logs through the `log` facade; this module installs the
// backend. Without a log directory, env_logger writes to stderr and honours
// RUST_LOG. With `--log-dir`, log4rs writes the same records to stderr and to
// a timestamped file in that directory.
//
// Progress bars share stderr, so either backend is wrapped in
// SuspendingLogger: records are written while the bars are cleared, and the
// bars are redrawn below them.
//
// USAGE:
// - default: info level
// - --verbose: debug level (includes ffmpeg command lines)
// - RUST_LOG overrides the env_logger level when no log directory is used

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::MultiProgress;
use log::{LevelFilter, Log, Metadata, Record};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

const CONSOLE_PATTERN: &str = "{h({l:<5})} {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}";

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Log file name for a run started at `timestamp`.
pub fn log_file_name(timestamp: &str) -> String {
    format!("loopcast_{timestamp}.log")
}

#[must_use]
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Writes records of `inner` while the bars of `multi` are hidden.
pub struct SuspendingLogger<L> {
    inner: L,
    multi: MultiProgress,
}

impl<L: Log> SuspendingLogger<L> {
    pub fn new(inner: L, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl<L: Log> Log for SuspendingLogger<L> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if self.inner.enabled(record.metadata()) {
            self.multi.suspend(|| self.inner.log(record));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Installs the global logger. Returns the log file path when one was opened.
///
/// Console output is coordinated with the bars drawn through `multi`.
pub fn init_logging(
    verbose: bool,
    log_dir: Option<&Path>,
    multi: &MultiProgress,
) -> Result<Option<PathBuf>> {
    let level = level_for(verbose);
    match log_dir {
        None => {
            let logger = env_logger::Builder::new()
                .filter_level(level)
                .parse_default_env()
                .format_timestamp(None)
                .format_target(false)
                .build();
            let max_level = logger.filter();
            install(SuspendingLogger::new(logger, multi.clone()), max_level)
                .context("Failed to initialize console logger")?;
            Ok(None)
        }
        Some(dir) => {
            let log_file = dir.join(log_file_name(&get_timestamp()));
            init_file_logging(&log_file, level, multi)?;
            Ok(Some(log_file))
        }
    }
}

fn install<L: Log + 'static>(logger: L, max_level: LevelFilter) -> Result<()> {
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}

fn init_file_logging(log_file: &Path, level: LevelFilter, multi: &MultiProgress) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create log directory '{}'", parent.display())
        })?;
    }

    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(log_file)
        .with_context(|| format!("Failed to open log file '{}'", log_file.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .appender(Appender::builder().build("file", Box::new(file)))
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(level),
        )?;

    let logger = log4rs::Logger::new(config);
    let max_level = logger.max_log_level();
    install(SuspendingLogger::new(logger, multi.clone()), max_level)
        .context("Failed to initialize file logger")?;
    Ok(())
}
