//! LockGate Session State
//!
//! - The Session is a singleton: lock flag, cached token, token expiry,
//!   bound profile and first-run flag
//! - It is persisted on every mutation, before the mutation is visible
//! - `SessionStore` is the only writer; all writes are serialized
//! - An unlocked session always carries a token

mod error;
mod session;
mod store;

pub use error::SessionError;
pub use session::{keys, Session, SessionPatch, DEFAULT_PROFILE};
pub use store::SessionStore;

pub type Result<T> = std::result::Result<T, SessionError>;
