//! Gate error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lockgate_remote::RemoteError;
use lockgate_session::SessionError;

/// Coarse classification surfaced to the host and the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Remote unreachable or timed out
    NetworkUnavailable,
    /// The service refused the credential
    InvalidCredential,
    /// Non-2xx or malformed answer
    ServerError,
    /// The durable store could not be read or written
    LocalStateError,
}

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Password is empty")]
    EmptyPassword,

    #[error("Credential rejected by auth service")]
    InvalidCredential,

    #[error("Auth service reported success without a token")]
    MissingToken,

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Authentication was interrupted")]
    Interrupted,

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl GateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GateError::EmptyPassword | GateError::InvalidCredential => {
                ErrorKind::InvalidCredential
            }
            GateError::MissingToken => ErrorKind::ServerError,
            GateError::Remote(e) if e.is_network() => ErrorKind::NetworkUnavailable,
            GateError::Remote(_) => ErrorKind::ServerError,
            GateError::Session(_)
            | GateError::Interrupted
            | GateError::InvalidTransition { .. } => ErrorKind::LocalStateError,
        }
    }

    /// Text safe to show on the auth surface. Never says whether the
    /// profile itself was recognized.
    pub fn user_message(&self) -> &'static str {
        match self {
            GateError::EmptyPassword => "Please enter a password.",
            _ => match self.kind() {
                ErrorKind::InvalidCredential => {
                    "Authentication failed. Please try again or contact support."
                }
                ErrorKind::NetworkUnavailable | ErrorKind::ServerError => {
                    "Error communicating with auth service. Is it running?"
                }
                ErrorKind::LocalStateError => "Could not record the session. Please try again.",
            },
        }
    }
}
