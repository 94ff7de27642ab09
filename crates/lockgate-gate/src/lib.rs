//! LockGate Gating Core
//!
//! Decides, for every navigation and new-window event, whether the
//! context may proceed or must be sent to the authentication surface.
//!
//! ```text
//! event ──> GateController ──> SessionStore (cached token, expiry)
//!                │        └──> TokenVerifier (stale token)
//!                └──> HealthProbe (fail-closed)
//!                          ↓
//!                 Allow | Redirect(auth surface)
//! ```
//!
//! Credentials go through [`AuthFlow`], which is the only path that can
//! unlock the session.

mod auth;
mod context;
mod controller;
mod error;
mod event;
mod health;
mod profile;
mod settings;
mod state;
mod verifier;

#[cfg(test)]
mod testing;

pub use auth::{AuthFlow, Outcome};
pub use context::{ContextInfo, ContextRegistry};
pub use controller::GateController;
pub use error::{ErrorKind, GateError};
pub use event::{ContextId, GateEvent, WindowId};
pub use health::HealthProbe;
pub use profile::{ProfileIdentifier, GUEST_PROFILE, UNKNOWN_SIGNED_IN};
pub use settings::GateSettings;
pub use state::{Decision, GateState};
pub use verifier::TokenVerifier;

pub type Result<T> = std::result::Result<T, GateError>;
