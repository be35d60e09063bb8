//! Error types for the screens engine.
//!
//! Only construction and environment subscription can fail. Running in an
//! environment without media-query support is NOT an error: the engine
//! degrades to an always-empty match map instead.

use thiserror::Error;

/// Errors raised by the screens engine and its environment hosts.
#[derive(Debug, Error)]
pub enum ScreensError {
    /// The breakpoint definitions could not be normalized.
    ///
    /// Raised synchronously at construction; never swallowed.
    #[error("invalid screens configuration: {0}")]
    Configuration(String),

    /// The environment refused to create a live media-query handle.
    #[error("media environment error: {0}")]
    Environment(String),

    /// A write through the accessor did not fit the key it targeted
    /// (e.g. a boolean written to `list`, or an override written to a breakpoint).
    #[error("invalid write to screens key `{key}`")]
    InvalidWrite { key: String },

    /// Configuration text was not valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScreensError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = ScreensError> = std::result::Result<T, E>;
