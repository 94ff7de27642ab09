//! Remote token verification
//!
//! Consulted when the cached expiry can no longer vouch for the token.
//! Unreachable or slow services count as "invalid": the session locks.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use lockgate_remote::AuthService;
use lockgate_session::{SessionPatch, SessionStore};

#[derive(Clone)]
pub struct TokenVerifier {
    service: Arc<dyn AuthService>,
    store: SessionStore,
    timeout: Duration,
    ttl: chrono::Duration,
}

enum Verdict {
    Valid,
    Invalid,
    Unreachable,
}

impl TokenVerifier {
    pub fn new(
        service: Arc<dyn AuthService>,
        store: SessionStore,
        timeout: Duration,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            service,
            store,
            timeout,
            ttl,
        }
    }

    /// Ask the service about `token` and record the answer.
    ///
    /// The store is only touched while it still holds `token`; a login or
    /// logout that landed during the request wins.
    pub async fn verify(&self, token: &str) -> bool {
        let verdict = match tokio::time::timeout(self.timeout, self.service.verify(token)).await {
            Ok(Ok(response)) if response.valid => Verdict::Valid,
            Ok(Ok(_)) => Verdict::Invalid,
            Ok(Err(e)) if e.is_network() => {
                tracing::warn!("Token verification unreachable, locking: {}", e);
                Verdict::Unreachable
            }
            Ok(Err(e)) => {
                tracing::warn!("Token verification failed, locking: {}", e);
                Verdict::Invalid
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Token verification timed out, locking"
                );
                Verdict::Unreachable
            }
        };

        let patch = match verdict {
            Verdict::Valid => SessionPatch::refresh(Utc::now() + self.ttl),
            Verdict::Invalid | Verdict::Unreachable => SessionPatch::lock(),
        };

        let applied = self.store.update(|session| {
            (session.token.as_deref() == Some(token)).then_some(patch)
        });

        match (verdict, applied) {
            (Verdict::Valid, Ok(Some(session))) => {
                tracing::debug!("Token verified, expiry refreshed");
                !session.locked
            }
            (Verdict::Valid, Ok(None)) => {
                tracing::debug!("Token changed during verification, ignoring result");
                false
            }
            (_, Ok(_)) => false,
            (_, Err(e)) => {
                tracing::error!("Failed to record verification result: {}", e);
                false
            }
        }
    }
}
