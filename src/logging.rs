//! File logging through `log4rs`.
//!
//! The terminal belongs to the UI, so log records go to a size-rolled file
//! only.

use std::path::{Path, PathBuf};

use log::{LevelFilter, info};
use log4rs::Config;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use thiserror::Error;

use crate::config::{LoggingSettings, default_log_path};

const LOG_FORMAT_FILE: &str =
    "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:>5.5} [{T:>12.12}] {t:<28.28} : {m}{n}";
const FILE_APPENDER: &str = "file";
const LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;
const LOG_FILE_COUNT: u32 = 3;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown log level {0:?}")]
    InvalidLevel(String),
    #[error("no log file location, set logging.file")]
    NoLogPath,
    #[error("failed to prepare log directory, {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid logger config, {0}")]
    InvalidConfig(String),
}

pub fn parse_level(level: &str) -> Result<LevelFilter, Error> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| Error::InvalidLevel(level.to_string()))
}

/// The log file to write: `logging.file` when set, the state dir otherwise.
pub fn log_path(settings: &LoggingSettings) -> Result<PathBuf, Error> {
    settings
        .file
        .clone()
        .or_else(default_log_path)
        .ok_or(Error::NoLogPath)
}

fn build_config(level: LevelFilter, path: &Path) -> Result<Config, Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let roll_pattern = format!("{}.{{}}", path.display());
    let roller = FixedWindowRoller::builder()
        .base(1)
        .build(&roll_pattern, LOG_FILE_COUNT)
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;
    let policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(LOG_FILE_SIZE)),
        Box::new(roller),
    );

    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_FORMAT_FILE)))
        .build(path, Box::new(policy))
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;

    Config::builder()
        .appender(Appender::builder().build(FILE_APPENDER, Box::new(appender)))
        .build(Root::builder().appender(FILE_APPENDER).build(level))
        .map_err(|e| Error::InvalidConfig(e.to_string()))
}

/// Install the global logger. Returns the file being written.
pub fn init(settings: &LoggingSettings) -> Result<PathBuf, Error> {
    let level = parse_level(&settings.level)?;
    let path = log_path(settings)?;
    let config = build_config(level, &path)?;

    log4rs::init_config(config).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    info!("logger initialized at {level}, writing {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_level_accepts_names_in_any_case() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level(" warn ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
    }

    #[test]
    fn parse_level_rejects_garbage() {
        let err = parse_level("loud").unwrap_err();
        assert!(matches!(err, Error::InvalidLevel(ref l) if l == "loud"));
    }

    #[test]
    fn log_path_prefers_configured_file() {
        let settings = LoggingSettings {
            level: "info".to_string(),
            file: Some(PathBuf::from("/tmp/cadenza-test.log")),
        };
        assert_eq!(
            log_path(&settings).unwrap(),
            PathBuf::from("/tmp/cadenza-test.log")
        );
    }

    #[test]
    fn build_config_creates_missing_log_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("cadenza.log");

        let config = build_config(LevelFilter::Debug, &path).expect("expected a config");

        assert_eq!(config.root().level(), LevelFilter::Debug);
        assert_eq!(config.appenders().len(), 1);
        assert!(path.parent().unwrap().is_dir());
    }
}
