use chrono::{DateTime, Utc};
use serde::Serialize;

use super::CommandResult;
use crate::state::AppState;

/// Session summary for support tooling. Never includes the token.
#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub version: &'static str,
    pub service_url: String,
    pub locked: bool,
    pub has_token: bool,
    pub token_expiry: Option<DateTime<Utc>>,
    pub bound_profile: String,
    pub initialized: bool,
    pub live_contexts: usize,
}

pub fn frontend_ready() -> CommandResult<()> {
    tracing::info!("Frontend ready");
    CommandResult::ok(())
}

pub fn diagnostics(state: &AppState) -> CommandResult<Diagnostics> {
    let gatekeeper = state.gatekeeper();
    let session = gatekeeper.session();

    CommandResult::ok(Diagnostics {
        version: env!("CARGO_PKG_VERSION"),
        service_url: gatekeeper.config().service_url.clone(),
        locked: session.locked,
        has_token: session.token.is_some(),
        token_expiry: session.token_expiry,
        bound_profile: session.bound_profile,
        initialized: session.initialized,
        live_contexts: gatekeeper.registry().len(),
    })
}
