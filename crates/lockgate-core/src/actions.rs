//! Replies and host actions
//!
//! Everything the host needs to do after a call is spelled out in the
//! reply; the host keeps no state of its own.

use serde::{Deserialize, Serialize};

use lockgate_gate::{ContextId, Decision, Outcome, WindowId};

/// Side effect the host must perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostAction {
    /// Point `context` at `url`
    Redirect { context: ContextId, url: String },
    /// Open the auth surface in a new context
    OpenAuthSurface { url: String },
    /// Close the auth surface; when it is the last context in its window a
    /// blank one is opened first so the window survives
    CloseAuthContext {
        context: ContextId,
        open_new_tab_first: bool,
    },
    /// The service launched `profile` elsewhere; this window goes away
    CloseWindow { window: WindowId, profile: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchReason {
    Installed,
    Updated,
    Startup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthReply {
    pub outcome: Outcome,
    pub clear_password: bool,
    pub message: String,
    pub actions: Vec<HostAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutReply {
    pub logged_out: bool,
    pub actions: Vec<HostAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReply {
    #[serde(flatten)]
    pub decision: Decision,
    pub actions: Vec<HostAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchReport {
    pub reason: LaunchReason,
    /// Profile bound to the session after detection
    pub profile: String,
    pub actions: Vec<HostAction>,
}

/// What the auth surface shows when it loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSurfaceStatus {
    pub profile: String,
    pub authenticated: bool,
    pub message: String,
    /// First-run notice, shown once per installation
    pub banner: Option<String>,
    pub actions: Vec<HostAction>,
}
