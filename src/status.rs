//! Exit status codes for the CLI
//!
//! - 0: Success
//! - 1: Any error (unloadable spec, missing inputs, network failure, HTTP
//!   errors with --check-status)
//! - 130: User interrupted (Ctrl+C, standard SIGINT exit code)

use std::process::{ExitCode, Termination};

/// Exit status codes following standard Unix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Successful execution
    Success = 0,
    /// Any error
    Error = 1,
    /// User interrupted (Ctrl+C) - standard SIGINT code
    Interrupted = 130,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl ExitStatus {
    /// Exit status for a response status code
    ///
    /// Status 0 (no response) is always an error. Otherwise only non-2xx
    /// responses with `check_status` set are errors.
    pub fn from_http_status(status_code: u16, check_status: bool) -> Self {
        if status_code == 0 {
            return ExitStatus::Error;
        }
        if !check_status || (200..300).contains(&status_code) {
            ExitStatus::Success
        } else {
            ExitStatus::Error
        }
    }
}
