//! Error types for the fitroom orchestration core.
//!
//! Every failure path surfaces as one of the kinds below, with the raw
//! diagnostic text (response body, task id) attached for operator
//! visibility. Callers pattern-match on the variant; the HTTP boundary
//! maps `kind()` + message into its failure envelope.

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for fitroom operations.
#[derive(Error, Debug)]
pub enum FitroomError {
    /// Input bytes are not a decodable image
    #[error("image decode failed: {message}")]
    Decode { message: String },

    /// Missing credential, or a configuration that the requested
    /// operation cannot work with (e.g. non-routable base URL for a
    /// URL-only provider)
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Network-level failure (connect error or timeout) that survived
    /// the single transport retry
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The remote provider answered, but not usefully: HTTP status
    /// >= 300, or a success payload missing required fields
    #[error("remote provider error{}: {body}", fmt_status(.status))]
    Remote { status: Option<u16>, body: String },

    /// Model output that could not be parsed into the expected shape
    #[error("malformed model response: {message}")]
    MalformedResponse { message: String, raw: String },

    /// The polling deadline elapsed before the job reached a terminal
    /// state; carries the last raw response body seen
    #[error("timed out after {}s waiting for remote job: {last_body}", .waited.as_secs())]
    Timeout { waited: Duration, last_body: String },
}

impl FitroomError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn remote(status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Remote {
            status,
            body: body.into(),
        }
    }

    /// Stable discriminant string for the caller layer's error mapping.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Config { .. } => "config",
            Self::Transport { .. } => "transport",
            Self::Remote { .. } => "remote",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Timeout { .. } => "timeout",
        }
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

/// Convenience type alias for fitroom results.
pub type Result<T> = std::result::Result<T, FitroomError>;
