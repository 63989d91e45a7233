// SPDX-License-Identifier: MIT

//! Application error types.
//!
//! Quota exhaustion is deliberately *not* represented here: running out of
//! API budget is a scheduling delay handled inside the client, not an error.
//! Only a configured wait cap turns it into `QuotaDeadline`.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Quota wait of {wait_secs}s exceeds configured cap of {cap_secs}s")]
    QuotaDeadline { wait_secs: u64, cap_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors raised by the token exchange path.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
