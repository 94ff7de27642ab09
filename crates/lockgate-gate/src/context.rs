//! Context Registry
//!
//! In-memory view of the host's live contexts and the gate state each
//! one was last left in. Only used to decide whether a host action still
//! has a target; it never influences an allow/redirect decision.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::GateError;
use crate::event::{ContextId, WindowId};
use crate::state::GateState;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextInfo {
    pub id: ContextId,
    pub window: Option<WindowId>,
    /// Last target reported for this context
    pub url: Option<String>,
    pub state: GateState,
    pub updated_at: DateTime<Utc>,
}

impl ContextInfo {
    fn new(id: ContextId) -> Self {
        Self {
            id,
            window: None,
            url: None,
            state: GateState::Unknown,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Default)]
pub struct ContextRegistry {
    contexts: Arc<RwLock<HashMap<ContextId, ContextInfo>>>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a context or refresh what is known about it.
    pub fn observe(&self, id: &str, window: Option<&str>, url: Option<&str>) -> ContextInfo {
        let mut contexts = self.contexts.write();
        let info = contexts
            .entry(id.to_string())
            .or_insert_with(|| ContextInfo::new(id.to_string()));

        if let Some(window) = window {
            info.window = Some(window.to_string());
        }
        if let Some(url) = url {
            info.url = Some(url.to_string());
        }
        info.updated_at = Utc::now();

        info.clone()
    }

    pub fn set_state(&self, id: &str, state: GateState) -> Result<ContextInfo> {
        let mut contexts = self.contexts.write();
        let info = contexts
            .entry(id.to_string())
            .or_insert_with(|| ContextInfo::new(id.to_string()));

        if !info.state.can_transition_to(state) {
            return Err(GateError::InvalidTransition {
                from: info.state.to_string(),
                to: state.to_string(),
            });
        }

        if info.state != state {
            tracing::debug!(
                context = %id,
                from = %info.state,
                to = %state,
                "Gate state transition"
            );
        }
        info.state = state;
        info.updated_at = Utc::now();

        Ok(info.clone())
    }

    /// Forget a context the host closed. Returns what was known about it.
    pub fn close(&self, id: &str) -> Option<ContextInfo> {
        let removed = self.contexts.write().remove(id);
        if removed.is_some() {
            tracing::debug!(context = %id, "Context closed");
        }
        removed
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.contexts.read().contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<ContextInfo> {
        self.contexts.read().get(id).cloned()
    }

    pub fn window_of(&self, id: &str) -> Option<WindowId> {
        self.contexts.read().get(id).and_then(|c| c.window.clone())
    }

    pub fn contexts_in_window(&self, window: &str) -> usize {
        self.contexts
            .read()
            .values()
            .filter(|c| c.window.as_deref() == Some(window))
            .count()
    }

    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.read().is_empty()
    }
}

impl Clone for ContextRegistry {
    fn clone(&self) -> Self {
        Self {
            contexts: Arc::clone(&self.contexts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_and_close() {
        let registry = ContextRegistry::new();
        registry.observe("tab-1", Some("win-1"), Some("https://a.example"));
        registry.observe("tab-2", Some("win-1"), None);
        registry.observe("tab-3", Some("win-2"), None);

        assert_eq!(registry.contexts_in_window("win-1"), 2);
        assert_eq!(registry.window_of("tab-3").as_deref(), Some("win-2"));

        // Later observations keep earlier facts they do not override
        let info = registry.observe("tab-1", None, None);
        assert_eq!(info.window.as_deref(), Some("win-1"));
        assert_eq!(info.url.as_deref(), Some("https://a.example"));

        assert!(registry.close("tab-1").is_some());
        assert!(!registry.is_live("tab-1"));
        assert!(registry.close("tab-1").is_none());
        assert_eq!(registry.contexts_in_window("win-1"), 1);
    }

    #[test]
    fn test_state_transitions() {
        let registry = ContextRegistry::new();
        let info = registry.observe("tab-1", None, None);
        assert_eq!(info.state, GateState::Unknown);

        registry.set_state("tab-1", GateState::Redirected).unwrap();
        registry.set_state("tab-1", GateState::Allowed).unwrap();
        assert_eq!(registry.get("tab-1").unwrap().state, GateState::Allowed);

        let err = registry.set_state("tab-1", GateState::Unknown).unwrap_err();
        assert!(matches!(err, GateError::InvalidTransition { .. }));
    }
}
