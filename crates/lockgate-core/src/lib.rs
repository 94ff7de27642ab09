//! LockGate Core
//!
//! Central coordination layer. The host (browser extension shell, native
//! messaging bridge) only translates its events into calls on
//! [`Gatekeeper`] and applies the returned [`HostAction`]s; all session
//! state lives here.

mod actions;
mod config;
mod error;
mod gatekeeper;

pub use actions::{
    AuthReply, AuthSurfaceStatus, EventReply, HostAction, LaunchReason, LaunchReport,
    LogoutReply, SessionStatus,
};
pub use config::Config;
pub use error::CoreError;
pub use gatekeeper::Gatekeeper;

// Re-export core components
pub use lockgate_gate::{
    ContextId, Decision, ErrorKind, GateEvent, GateState, Outcome, WindowId, GUEST_PROFILE,
    UNKNOWN_SIGNED_IN,
};
pub use lockgate_remote::{AuthService, HttpAuthService};
pub use lockgate_session::Session;
pub use lockgate_storage::Database;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
///
/// Logs go to stderr; stdout belongs to the host protocol.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
