//! Remote service error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Auth service unreachable: {0}")]
    Unreachable(String),

    #[error("Auth service request timed out")]
    Timeout,

    #[error("Auth service returned HTTP {0}")]
    Status(u16),

    #[error("Malformed response from auth service: {0}")]
    Decode(String),

    #[error("Invalid service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl RemoteError {
    /// The service could not be reached at all, as opposed to answering badly.
    pub fn is_network(&self) -> bool {
        matches!(self, RemoteError::Unreachable(_) | RemoteError::Timeout)
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout
        } else if let Some(status) = e.status() {
            RemoteError::Status(status.as_u16())
        } else if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else if e.is_connect() || e.is_request() || e.is_body() {
            RemoteError::Unreachable(e.to_string())
        } else {
            RemoteError::Client(e.to_string())
        }
    }
}
