//! Error types for the upstream clients.

use thiserror::Error;

/// Errors that can occur while talking to the scrobbling or art
/// services.
///
/// "Found nothing" outcomes (unknown user, empty top lists, no art)
/// are not errors; those surface as `None`/empty values so command
/// handlers can word them precisely.
#[derive(Debug, Error)]
pub enum FetchError {
    /// An HTTP request to an upstream service failed.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: &'static str,
        message: String,
    },

    /// A response from an upstream service could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: &'static str,
        message: String,
    },

    /// Authentication with an upstream service failed even after a
    /// credential refresh.
    #[error("authentication rejected by {source_name}")]
    Unauthorized { source_name: &'static str },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl FetchError {
    /// Returns `true` when the error is transient and the operation may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Request(_))
    }
}

/// Convenience alias for fetch results.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
