//! Application state management
use lockgate_core::{Config, Gatekeeper, Result};

/// Shared state behind every command
pub struct AppState {
    gatekeeper: Gatekeeper,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        let gatekeeper = Gatekeeper::new(config)?;

        Ok(Self::with_gatekeeper(gatekeeper))
    }

    pub fn with_gatekeeper(gatekeeper: Gatekeeper) -> Self {
        Self { gatekeeper }
    }

    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gatekeeper
    }
}
