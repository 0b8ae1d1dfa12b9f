use derive_more::{Display, Error};
use std::process::ExitCode;

use crate::protocol::types::Backend;

/// Every way a poll session can end other than a shutdown request.
///
/// Variants are grouped the way they are reported: argument problems are
/// found before anything is opened, connection problems while the session is
/// being set up, and read problems once the dashboard is live. All of them
/// are printed to stderr only after the terminal has been restored.
#[derive(Debug, Display, Error)]
pub enum PollError {
    #[display("{reason}")]
    Argument { reason: String },

    #[display("Cannot allocate memory for {what}")]
    Allocation { what: &'static str },

    #[display("{backend} mode is not yet supported.")]
    UnsupportedMode { backend: Backend },

    #[display("Invalid slave ID {unit_id}")]
    InvalidSlaveId { unit_id: u8 },

    #[display("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[display("{reason}")]
    Read { reason: String },

    #[display("Terminal error: {reason}")]
    Terminal { reason: String },
}

impl PollError {
    pub fn argument(reason: impl Into<String>) -> Self {
        Self::Argument {
            reason: reason.into(),
        }
    }

    pub fn read(err: impl std::fmt::Display) -> Self {
        Self::Read {
            reason: err.to_string(),
        }
    }

    pub fn terminal(err: impl std::fmt::Display) -> Self {
        Self::Terminal {
            reason: err.to_string(),
        }
    }

    /// The unsupported-backend notice is informational, so it exits cleanly.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PollError::UnsupportedMode { .. })
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_fatal() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

impl From<std::io::Error> for PollError {
    fn from(err: std::io::Error) -> Self {
        PollError::terminal(err)
    }
}
