//! Host events consumed by the gate

use serde::{Deserialize, Serialize};

/// Host identifier of a tab-like context.
pub type ContextId = String;
/// Host identifier of a top-level window.
pub type WindowId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GateEvent {
    /// A context started loading `url`
    Navigation {
        context: ContextId,
        #[serde(default)]
        window: Option<WindowId>,
        url: String,
    },
    /// A new top-level window opened with `context` active in it
    WindowCreated {
        window: WindowId,
        context: ContextId,
        #[serde(default)]
        url: Option<String>,
    },
}

impl GateEvent {
    pub fn context(&self) -> &str {
        match self {
            GateEvent::Navigation { context, .. } | GateEvent::WindowCreated { context, .. } => {
                context
            }
        }
    }

    pub fn window(&self) -> Option<&str> {
        match self {
            GateEvent::Navigation { window, .. } => window.as_deref(),
            GateEvent::WindowCreated { window, .. } => Some(window),
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            GateEvent::Navigation { url, .. } => Some(url),
            GateEvent::WindowCreated { url, .. } => url.as_deref(),
        }
    }

    pub fn opens_window(&self) -> bool {
        matches!(self, GateEvent::WindowCreated { .. })
    }
}
