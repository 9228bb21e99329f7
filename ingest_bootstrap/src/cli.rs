// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface
//!
//! Parses and validates the run's command-line surface: `clap` derive
//! for raw parsing, then a `ValidatedCli` that has already checked the
//! things `main.rs` would otherwise have to check itself — `config_dir`
//! exists and is a directory, `watch_interval` is a positive duration,
//! `log_level` maps onto a `tracing::Level`.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_WATCH_INTERVAL_SECS: u64 = 60;

/// Raw CLI surface, parsed by `clap` before validation.
#[derive(Parser, Debug, Clone)]
#[command(name = "ingest-pipeline")]
#[command(about = concat!("Document ingestion pipeline v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    /// Directory containing `global.yaml` and per-stage config files.
    #[arg(long, value_name = "DIR")]
    pub config_dir: PathBuf,

    /// Optional `.env` file to preload before `${VAR}` substitution.
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Minimum log level.
    #[arg(long, value_enum, default_value_t = LogLevelArg::Info)]
    pub log_level: LogLevelArg,

    /// Report configuration and provider health, then exit without processing.
    #[arg(long)]
    pub status: bool,

    /// Keep running, re-scanning the input directory at `--watch-interval`.
    #[arg(long)]
    pub watch: bool,

    /// Seconds between scans when `--watch` is set.
    #[arg(long, value_name = "SECONDS")]
    pub watch_interval: Option<u64>,
}

/// `--log-level` values, named to match the spec's contract rather than
/// `tracing`'s own casing.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevelArg {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevelArg {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevelArg::Debug => tracing::Level::DEBUG,
            LogLevelArg::Info => tracing::Level::INFO,
            LogLevelArg::Warning => tracing::Level::WARN,
            // tracing has no CRITICAL level; both map onto ERROR.
            LogLevelArg::Error | LogLevelArg::Critical => tracing::Level::ERROR,
        }
    }
}

/// Errors raised while validating a parsed [`Cli`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("--config-dir does not exist: {0}")]
    ConfigDirNotFound(PathBuf),

    #[error("--config-dir is not a directory: {0}")]
    ConfigDirNotADirectory(PathBuf),

    #[error("--env-file does not exist: {0}")]
    EnvFileNotFound(PathBuf),

    #[error("--watch-interval must be a positive number of seconds, got {0}")]
    InvalidWatchInterval(u64),

    #[error("clap argument parsing failed: {0}")]
    Clap(#[from] clap::Error),
}

/// CLI flags after validation, ready for the composition root.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub config_dir: PathBuf,
    pub env_file: Option<PathBuf>,
    pub log_level: tracing::Level,
    pub status: bool,
    pub watch: bool,
    pub watch_interval: Duration,
}

impl ValidatedCli {
    /// Validate a parsed [`Cli`], checking filesystem and range constraints
    /// that `clap`'s own value parsers can't express.
    pub fn from_cli(cli: Cli) -> Result<Self, ParseError> {
        if !cli.config_dir.exists() {
            return Err(ParseError::ConfigDirNotFound(cli.config_dir));
        }
        if !cli.config_dir.is_dir() {
            return Err(ParseError::ConfigDirNotADirectory(cli.config_dir));
        }

        if let Some(ref env_file) = cli.env_file {
            if !env_file.exists() {
                return Err(ParseError::EnvFileNotFound(env_file.clone()));
            }
        }

        let watch_interval_secs = cli.watch_interval.unwrap_or(DEFAULT_WATCH_INTERVAL_SECS);
        if watch_interval_secs == 0 {
            return Err(ParseError::InvalidWatchInterval(watch_interval_secs));
        }

        Ok(Self {
            config_dir: cli.config_dir,
            env_file: cli.env_file,
            log_level: cli.log_level.to_tracing_level(),
            status: cli.status,
            watch: cli.watch,
            watch_interval: Duration::from_secs(watch_interval_secs),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

/// Parse `std::env::args()` and validate the result.
///
/// Clap handles `--help`/`--version` by exiting the process directly.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = Cli::parse();
    ValidatedCli::from_cli(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli(config_dir: PathBuf) -> Cli {
        Cli {
            config_dir,
            env_file: None,
            log_level: LogLevelArg::Info,
            status: false,
            watch: false,
            watch_interval: None,
        }
    }

    #[test]
    fn rejects_missing_config_dir() {
        let cli = base_cli(PathBuf::from("/no/such/path/ever"));
        let result = ValidatedCli::from_cli(cli);
        assert!(matches!(result, Err(ParseError::ConfigDirNotFound(_))));
    }

    #[test]
    fn rejects_config_dir_that_is_a_file() {
        let tmp = std::env::temp_dir().join("ingest_pipeline_cli_test_file.txt");
        std::fs::write(&tmp, b"not a dir").unwrap();
        let cli = base_cli(tmp.clone());
        let result = ValidatedCli::from_cli(cli);
        assert!(matches!(result, Err(ParseError::ConfigDirNotADirectory(_))));
        let _ = std::fs::remove_file(&tmp);
    }

    #[test]
    fn accepts_valid_config_dir() {
        let tmp = std::env::temp_dir();
        let cli = base_cli(tmp);
        let result = ValidatedCli::from_cli(cli);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().watch_interval, Duration::from_secs(DEFAULT_WATCH_INTERVAL_SECS));
    }

    #[test]
    fn rejects_zero_watch_interval() {
        let tmp = std::env::temp_dir();
        let mut cli = base_cli(tmp);
        cli.watch_interval = Some(0);
        let result = ValidatedCli::from_cli(cli);
        assert!(matches!(result, Err(ParseError::InvalidWatchInterval(0))));
    }

    #[test]
    fn log_level_maps_to_tracing() {
        assert_eq!(LogLevelArg::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(LogLevelArg::Warning.to_tracing_level(), tracing::Level::WARN);
        assert_eq!(LogLevelArg::Critical.to_tracing_level(), tracing::Level::ERROR);
    }
}
