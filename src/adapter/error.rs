use std::time::Duration;

use thiserror::Error;

/// Everything that can end an exchange without a parsed body.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Coarse failure tag, kept alongside the message so callers can branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidRequest,
    Transport,
    Parse,
    Timeout,
}

impl AdapterError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AdapterError::InvalidRequest(_) => FailureKind::InvalidRequest,
            AdapterError::Transport(_) => FailureKind::Transport,
            AdapterError::Parse(_) => FailureKind::Parse,
            AdapterError::Timeout(_) => FailureKind::Timeout,
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's Display omits the underlying cause (e.g. "connection refused")
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        AdapterError::Transport(message)
    }
}
