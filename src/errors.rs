//! Unified error type for the crate.
//!
//! Every fallible operation returns [`Result`]. Remote-store failures are
//! surfaced here but the reconciler never propagates them to its callers; it
//! folds them into the pending-sync flags instead.

use crate::transfer::ImportError;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Embedded remote database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No product exists with the given id.
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// The id that was looked up
        id: String,
    },

    /// A quantity or price is negative, zero where forbidden, or not finite.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending value
        amount: f64,
    },

    /// A product failed a field-level check (e.g. empty name).
    #[error("Invalid product: {message}")]
    InvalidProduct {
        /// Description of the problem
        message: String,
    },

    /// Filesystem error from the local store or an export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure (connection refused, timeout, bad body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote store answered with a non-2xx status.
    #[error("Remote store returned {status}: {message}")]
    RemoteStatus {
        /// HTTP status code
        status: u16,
        /// The `error` field of the body, or the raw body
        message: String,
    },

    /// An imported document did not match the product schema.
    #[error("Import rejected: {0}")]
    Import(#[from] ImportError),
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Config {
            message: format!("Failed to parse config: {value}"),
        }
    }
}

impl Error {
    /// True for failures that came from talking to the remote store.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::RemoteStatus { .. } | Self::Database(_)
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
