//! Error types for the feed pipeline.

use thiserror::Error;

use crate::models::CaptureStatus;

/// Failure of a single fetch cycle.
///
/// None of these escape the feed client: each one is folded into an empty
/// snapshot with an annotated capture label.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Upstream answered with a non-200 status
    #[error("upstream returned status {code}")]
    HttpStatus { code: u16 },

    /// Could not connect, or the upstream dropped the connection
    #[error("connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// The request exceeded the client timeout
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Upstream misbehaved at the HTTP level (status error, redirect loop)
    #[error("API error: {0}")]
    Api(#[source] reqwest::Error),

    /// Any other transport-level failure
    #[error("request error: {0}")]
    Request(#[source] reqwest::Error),

    /// Response body is not a valid feed message
    #[error("failed to decode feed message: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Decoding task panicked or was cancelled
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl FeedError {
    /// Category shown in the capture label
    pub fn capture_status(&self) -> CaptureStatus {
        match self {
            FeedError::HttpStatus { code } => CaptureStatus::HttpStatus(*code),
            FeedError::Connection(_) => CaptureStatus::Connection,
            FeedError::Timeout(_) => CaptureStatus::Timeout,
            FeedError::Api(_) => CaptureStatus::Api,
            FeedError::Request(_) => CaptureStatus::Request,
            FeedError::Decode(_) | FeedError::Unexpected(_) => CaptureStatus::Error,
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        // Connect phase first: a connect timeout reports both.
        if err.is_connect() {
            FeedError::Connection(err)
        } else if err.is_timeout() {
            FeedError::Timeout(err)
        } else if is_dropped_connection(&err) {
            FeedError::Connection(err)
        } else if err.is_status() || err.is_redirect() {
            FeedError::Api(err)
        } else {
            FeedError::Request(err)
        }
    }
}

impl From<tokio::task::JoinError> for FeedError {
    fn from(err: tokio::task::JoinError) -> Self {
        FeedError::Unexpected(err.to_string())
    }
}

/// Whether any cause in the chain is an I/O error from a connection the
/// peer refused, reset or closed mid-exchange.
fn is_dropped_connection(err: &(dyn std::error::Error + 'static)) -> bool {
    use std::io::ErrorKind;

    let mut cause = Some(err);
    while let Some(e) = cause {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::ConnectionRefused
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        cause = e.source();
    }
    false
}

/// Invalid configuration detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {message}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        message: String,
    },

    #[error("invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
