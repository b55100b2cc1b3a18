//! # AppError
//!
//! Centralized error handling for the board.
//! Every failure a request can end in maps to exactly one variant here;
//! the HTTP adapter turns the variant into a status code.

use thiserror::Error;

/// The primary error type for all board operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing field, malformed command, empty argument
    #[error("{0}")]
    Validation(String),

    /// No verifiable caller identity was supplied
    #[error("authentication required: {0}")]
    Unauthenticated(String),

    /// Caller tier below the required minimum, or a role change out of range
    #[error("{0}")]
    PermissionDenied(String),

    /// Unknown username or post number
    #[error("{kind} \"{key}\" not found")]
    NotFound { kind: &'static str, key: String },

    /// Posting cooldown still running
    #[error("posting too fast, wait {remaining_secs} more second(s)")]
    RateLimited { remaining_secs: i64 },

    /// Reserved command name
    #[error("{0}")]
    NotImplemented(String),

    /// Infrastructure failure (DB down, constraint violation, ...)
    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn user_not_found(username: &str) -> Self {
        AppError::NotFound {
            kind: "user",
            key: username.to_string(),
        }
    }

    pub fn post_not_found(no: i64) -> Self {
        AppError::NotFound {
            kind: "post",
            key: no.to_string(),
        }
    }
}

/// A specialized Result type for board logic.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_read_as_user_facing_text() {
        assert_eq!(
            AppError::user_not_found("alice").to_string(),
            "user \"alice\" not found"
        );
        assert_eq!(
            AppError::RateLimited { remaining_secs: 3 }.to_string(),
            "posting too fast, wait 3 more second(s)"
        );
        let storage: AppError = anyhow::anyhow!("disk full").into();
        assert_eq!(storage.to_string(), "storage failure: disk full");
    }
}
