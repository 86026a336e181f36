//! Unified error type for the rice mill ledger.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants map
//! one-to-one onto the way failures are reported to callers: validation and
//! conflict problems are the client's to fix, a missing target is reported as
//! such, and anything that goes wrong inside a ledger transaction is rolled
//! back and surfaced as [`Error::Transaction`].

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Application error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input (e.g. an FRK movement with no positive quantity)
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Duplicate business key (memo id, challan number, godown name)
    #[error("Conflict: {message}")]
    Conflict {
        /// Which key collided
        message: String,
    },

    /// Update or delete target does not exist in the given scope
    #[error("Not found: {message}")]
    NotFound {
        /// What was looked up
        message: String,
    },

    /// A step inside a ledger transaction failed; the transaction was rolled back
    #[error("Transaction failed: {source}")]
    Transaction {
        /// The database error raised by the failing step
        source: DbErr,
    },

    /// Database error outside of a ledger transaction
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// I/O error (binding the listener, reading config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Maps an insert failure, turning a unique-constraint violation into a conflict.
    pub(crate) fn from_insert(err: DbErr, conflict_message: impl Into<String>) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::conflict(conflict_message),
            _ => Self::Database(err),
        }
    }

    /// Whether the caller is at fault (4xx) rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Conflict { .. } | Self::NotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
