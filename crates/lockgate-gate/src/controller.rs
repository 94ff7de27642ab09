//! Gate Controller
//!
//! Runs the full transition for every event, independently per context:
//!
//! 1. A new window locks the session first, whatever it held before
//! 2. The auth surface and privileged pages are always allowed
//! 3. Fresh cached token on an unlocked session → candidate allow
//! 4. Stale token → remote verification decides
//! 5. No token → redirect
//! 6. A candidate allow still needs a live auth service; an unreachable
//!    service means redirect, never "trust the cache"

use chrono::Utc;
use std::sync::Arc;

use lockgate_remote::AuthService;
use lockgate_session::SessionStore;

use crate::context::ContextRegistry;
use crate::event::GateEvent;
use crate::health::HealthProbe;
use crate::settings::GateSettings;
use crate::state::Decision;
use crate::verifier::TokenVerifier;

#[derive(Clone)]
pub struct GateController {
    store: SessionStore,
    verifier: TokenVerifier,
    probe: HealthProbe,
    registry: ContextRegistry,
    settings: Arc<GateSettings>,
}

impl GateController {
    pub fn new(
        store: SessionStore,
        service: Arc<dyn AuthService>,
        registry: ContextRegistry,
        settings: Arc<GateSettings>,
    ) -> Self {
        let verifier = TokenVerifier::new(
            Arc::clone(&service),
            store.clone(),
            settings.request_timeout,
            settings.verify_ttl,
        );
        let probe = HealthProbe::new(service, settings.health_timeout);

        Self {
            store,
            verifier,
            probe,
            registry,
            settings,
        }
    }

    pub async fn handle(&self, event: &GateEvent) -> Decision {
        let context = event.context();

        if event.opens_window() {
            // On failure the store has already dropped to locked in memory
            if let Err(e) = self.store.reset() {
                tracing::error!("Failed to persist lock for new window: {}", e);
            }
            tracing::info!(
                window = event.window().unwrap_or_default(),
                "New window opened, session locked"
            );
        }

        self.registry
            .observe(context, event.window(), event.target());

        let decision = match event.target() {
            Some(target) if self.settings.is_exempt(target) => Decision::Allow,
            _ => self.evaluate().await,
        };

        if let Err(e) = self.registry.set_state(context, decision.state()) {
            tracing::warn!(context = %context, "Could not record gate state: {}", e);
        }

        tracing::debug!(
            context = %context,
            decision = %decision.state(),
            "Gate decision"
        );

        decision
    }

    /// Steps 3–5: cache first, then remote verification of a stale token.
    pub async fn is_authenticated(&self) -> bool {
        let session = self.store.read();
        let now = Utc::now();

        if session.is_authenticated_at(now) {
            return true;
        }

        match session.token.as_deref() {
            Some(token) if session.needs_verification_at(now) => {
                tracing::debug!("Cached expiry lapsed, verifying token");
                self.verifier.verify(token).await
            }
            _ => false,
        }
    }

    async fn evaluate(&self) -> Decision {
        if !self.is_authenticated().await {
            return self.redirect();
        }

        if !self.probe.is_alive().await {
            tracing::warn!("Auth service not reachable, staying locked");
            return self.redirect();
        }

        Decision::Allow
    }

    /// Send the context to the auth surface.
    pub fn redirect(&self) -> Decision {
        Decision::Redirect {
            to: self.settings.auth_surface_url.clone(),
        }
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }
}
