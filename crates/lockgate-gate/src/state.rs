//! Gate State Machine
//!
//! ```text
//! Unknown
//!   ↓ evaluate
//! Allowed ⇄ Redirected
//! ```
//!
//! Every context starts `Unknown` and each evaluation settles it in one
//! of the two terminal states. Nothing returns to `Unknown`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    /// Not evaluated yet
    Unknown,
    /// Last evaluation let the context through
    Allowed,
    /// Last evaluation sent the context to the auth surface
    Redirected,
}

impl GateState {
    pub fn can_transition_to(&self, target: GateState) -> bool {
        match (self, target) {
            (_, GateState::Unknown) => *self == GateState::Unknown,
            _ => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Unknown => "unknown",
            GateState::Allowed => "allowed",
            GateState::Redirected => "redirected",
        }
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GateState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(GateState::Unknown),
            "allowed" => Ok(GateState::Allowed),
            "redirected" => Ok(GateState::Redirected),
            _ => Err(format!("Unknown gate state: {}", s)),
        }
    }
}

/// What the host must do with the navigation it reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Redirect { to: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn state(&self) -> GateState {
        match self {
            Decision::Allow => GateState::Allowed,
            Decision::Redirect { .. } => GateState::Redirected,
        }
    }
}
