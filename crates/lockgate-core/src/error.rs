//! Core error types

use thiserror::Error;

use lockgate_gate::ErrorKind;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] lockgate_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] lockgate_session::SessionError),

    #[error("Remote error: {0}")]
    Remote(#[from] lockgate_remote::RemoteError),

    #[error("Gate error: {0}")]
    Gate(#[from] lockgate_gate::GateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Remote(e) if e.is_network() => ErrorKind::NetworkUnavailable,
            CoreError::Remote(_) => ErrorKind::ServerError,
            CoreError::Gate(e) => e.kind(),
            CoreError::Storage(_)
            | CoreError::Session(_)
            | CoreError::Io(_)
            | CoreError::Config(_) => ErrorKind::LocalStateError,
        }
    }
}
