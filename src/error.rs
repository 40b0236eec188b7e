use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single call to the answering service.
///
/// The conversation never shows these to the user directly; every variant
/// collapses into the same warning message. They exist for logging and for
/// the one-shot `ask` command.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("answering service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("cannot build request url from base `{0}`")]
    InvalidUrl(String),

    /// `.` and `..` are resolved away as path segments, so the question
    /// would never reach the service.
    #[error("input `{0}` cannot be sent as a path segment")]
    DotSegment(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(err)
        }
    }
}
