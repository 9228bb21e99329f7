// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Code Management
//!
//! Standardized Unix exit codes following BSD `sysexits.h` conventions, plus
//! the two helpers `main.rs` needs to turn a `Result` into a process exit
//! code: `0` on success (including a bare `--status` run), non-zero on a
//! configuration or stage-fatal error.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ingest_bootstrap::exit_code::{result_to_exit_code, ExitCode};
//!
//! fn run_pipeline() -> Result<(), Box<dyn std::error::Error>> {
//!     Ok(())
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     result_to_exit_code(run_pipeline())
//! }
//! ```

use std::fmt;

/// Exit codes following Unix conventions (BSD sysexits.h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful termination (0).
    #[default]
    Success = 0,

    /// General error (1).
    Error = 1,

    /// Command line usage error (64): invalid arguments, unknown flags.
    UsageError = 64,

    /// Data format error (65): malformed config, parse errors.
    DataError = 65,

    /// Cannot open input (66): file not found, cannot read.
    NoInput = 66,

    /// Service unavailable (69): provider/backend unreachable.
    Unavailable = 69,

    /// Internal software error (70): stage-fatal, unexpected invariant break.
    Software = 70,

    /// I/O error (74).
    IoError = 74,

    /// Temporary failure, retry (75): rate-limit exhaustion.
    TempFail = 75,

    /// Remote error in protocol (76): malformed provider/backend response.
    Protocol = 76,

    /// Permission denied (77).
    NoPerm = 77,

    /// Configuration error (78): missing required section, invalid enum, missing env var.
    Config = 78,

    /// Interrupted by signal (SIGINT - Ctrl+C) (130).
    Interrupted = 130,

    /// Terminated by signal (SIGTERM) (143).
    Terminated = 143,
}

impl ExitCode {
    /// Convert to i32 for use with `std::process::exit`.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Map an error to an exit code by sniffing its `Display` text.
    ///
    /// The bootstrap crate sits below the application crates and cannot name
    /// their error types directly, so this works off of the error taxonomy's
    /// vocabulary: "configuration", "rate limit", "not found", etc.
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        let text = error.to_string().to_lowercase();

        if text.contains("configuration") || text.contains("config") {
            ExitCode::Config
        } else if text.contains("rate limit") || text.contains("rate-limit") {
            ExitCode::TempFail
        } else if text.contains("permission") || text.contains("access denied") {
            ExitCode::NoPerm
        } else if text.contains("not found") || text.contains("no such") {
            ExitCode::NoInput
        } else if text.contains("invalid") || text.contains("argument") {
            ExitCode::UsageError
        } else if text.contains("parse") || text.contains("deserializ") || text.contains("format") {
            ExitCode::DataError
        } else if text.contains("unavailable") || text.contains("connect") {
            ExitCode::Unavailable
        } else if text.contains("protocol") || text.contains("unexpected response") {
            ExitCode::Protocol
        } else if text.contains("io error") || text.contains("read") || text.contains("write") {
            ExitCode::IoError
        } else if text.contains("stage") && text.contains("fatal") {
            ExitCode::Software
        } else {
            ExitCode::Error
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::Error => "General error",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::NoInput => "Cannot open input",
            ExitCode::Unavailable => "Service unavailable",
            ExitCode::Software => "Internal software error",
            ExitCode::IoError => "I/O error",
            ExitCode::TempFail => "Temporary failure, retry",
            ExitCode::Protocol => "Remote error in protocol",
            ExitCode::NoPerm => "Permission denied",
            ExitCode::Config => "Configuration error",
            ExitCode::Interrupted => "Interrupted by signal (SIGINT)",
            ExitCode::Terminated => "Terminated by signal (SIGTERM)",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn is_error(self) -> bool {
        !self.is_success()
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

/// Map a boxed error to an `ExitCode` via [`ExitCode::from_error`].
pub fn map_error_to_exit_code(error: &(dyn std::error::Error + 'static)) -> ExitCode {
    ExitCode::from_error(error)
}

/// Turn a run's `Result` into a process exit code.
///
/// `Ok(())` maps to `Success` regardless of whether the run processed any
/// files or only reported `--status`. `Err` maps through
/// [`map_error_to_exit_code`].
pub fn result_to_exit_code<E>(result: Result<(), E>) -> std::process::ExitCode
where
    E: std::error::Error + 'static,
{
    match result {
        Ok(()) => std::process::ExitCode::from(ExitCode::Success),
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            std::process::ExitCode::from(map_error_to_exit_code(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::Error.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 64);
        assert_eq!(ExitCode::Config.as_i32(), 78);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
        assert_eq!(ExitCode::Terminated.as_i32(), 143);
    }

    #[test]
    fn test_default_is_success() {
        assert_eq!(ExitCode::default(), ExitCode::Success);
        assert!(ExitCode::default().is_success());
    }

    #[test]
    fn test_from_error_configuration() {
        #[derive(Debug)]
        struct E(String);
        impl fmt::Display for E {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
        impl std::error::Error for E {}

        let err = E("missing required configuration section: providers".to_string());
        assert_eq!(ExitCode::from_error(&err), ExitCode::Config);

        let err = E("rate limit exceeded after 3 retries".to_string());
        assert_eq!(ExitCode::from_error(&err), ExitCode::TempFail);
    }

    #[test]
    fn test_display() {
        let display = format!("{}", ExitCode::Config);
        assert!(display.contains("Configuration error"));
        assert!(display.contains("78"));
    }

    #[test]
    fn test_result_to_exit_code_success() {
        // std::process::ExitCode has no PartialEq; just confirm the Ok path
        // doesn't panic and produces a value.
        let result: Result<(), std::io::Error> = Ok(());
        let _code = result_to_exit_code(result);
    }
}
