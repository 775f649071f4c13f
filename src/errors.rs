//! Unified error type for langrank.
//!
//! Budget rejections are not errors: they come back as
//! [`crate::core::vote::VoteOutcome::Rejected`]. Everything here is either an expected
//! lookup failure (not found, unauthenticated) or an infrastructure fault.

use sea_orm::DbErr;
use thiserror::Error;

/// All errors that can occur in langrank
#[derive(Debug, Error)]
pub enum Error {
    /// Read or write against the store failed; safe to retry the whole submission
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Referenced language does not exist
    #[error("Language not found: {language}")]
    LanguageNotFound {
        /// Language id or name as given by the caller
        language: String,
    },

    /// Referenced user does not exist
    #[error("User not found: {user_id}")]
    UserNotFound {
        /// Internal user id
        user_id: i64,
    },

    /// Period key is not a valid `YYYY-MM` month
    #[error("Invalid period '{value}': expected YYYY-MM")]
    InvalidPeriod {
        /// The rejected input
        value: String,
    },

    /// Request payload is malformed
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Parser message
        message: String,
    },

    /// No valid session when one is required
    #[error("Not authenticated: {reason}")]
    Unauthenticated {
        /// Why the session was refused
        reason: String,
    },

    /// The identity provider refused the authorization code
    #[error("Identity provider error: {message}")]
    Identity {
        /// Provider message
        message: String,
    },

    /// A concurrent writer pushed the user's totals over a cap before commit
    #[error("Concurrent vote changed the budget of user {user_id}")]
    ConcurrencyConflict {
        /// User whose budget was contended
        user_id: i64,
    },

    /// Retry budget exhausted after a transient failure
    #[error("Vote could not be recorded, please try again ({message})")]
    TryAgain {
        /// Last underlying failure
        message: String,
    },
}

impl Error {
    /// Whether the failure is transient and the submission may be re-run from validation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::ConcurrencyConflict { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
