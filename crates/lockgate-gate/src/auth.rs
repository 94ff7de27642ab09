//! Credential submission
//!
//! The only path that can unlock the session. Outcomes:
//! - `success` → token cached for the login TTL, session bound to the
//!   profile the service unlocked
//! - `guest` → session stays locked; not an error
//! - anything else, or no usable answer → failure

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use lockgate_remote::{AuthService, LoginResponse, LoginStatus, RemoteError};
use lockgate_session::{SessionPatch, SessionStore};

use crate::error::{ErrorKind, GateError};

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        #[serde(skip_serializing)]
        token: String,
        bound_profile: String,
        different_profile: bool,
    },
    Guest,
    Failure {
        kind: ErrorKind,
        message: String,
    },
}

impl Outcome {
    pub fn failure(error: GateError) -> Self {
        Outcome::Failure {
            kind: error.kind(),
            message: error.user_message().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// The password field is cleared after every submission.
    pub fn clears_password(&self) -> bool {
        true
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::Success {
                bound_profile,
                different_profile: true,
                ..
            } => format!(
                "Authentication successful. Launching different profile: {bound_profile}. This window will close."
            ),
            Outcome::Success { .. } => "Authentication successful.".to_string(),
            Outcome::Guest => "Launching Guest mode. This page will close or refresh.".to_string(),
            Outcome::Failure { message, .. } => message.clone(),
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success {
                bound_profile,
                different_profile,
                ..
            } => f
                .debug_struct("Success")
                .field("token", &"<redacted>")
                .field("bound_profile", bound_profile)
                .field("different_profile", different_profile)
                .finish(),
            Outcome::Guest => f.write_str("Guest"),
            Outcome::Failure { kind, message } => f
                .debug_struct("Failure")
                .field("kind", kind)
                .field("message", message)
                .finish(),
        }
    }
}

#[derive(Clone)]
pub struct AuthFlow {
    service: Arc<dyn AuthService>,
    store: SessionStore,
    timeout: Duration,
    ttl: chrono::Duration,
}

impl AuthFlow {
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

    pub async fn submit(&self, password: &SecretString, profile_hint: &str) -> Outcome {
        if password.expose_secret().is_empty() {
            return Outcome::failure(GateError::EmptyPassword);
        }

        tracing::info!(profile = %profile_hint, "Authenticating");

        let response =
            match tokio::time::timeout(self.timeout, self.service.login(password, profile_hint))
                .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    tracing::warn!("Login request failed: {}", e);
                    return Outcome::failure(e.into());
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Login request timed out"
                    );
                    return Outcome::failure(RemoteError::Timeout.into());
                }
            };

        match response.login_status() {
            LoginStatus::Success => self.complete_login(response, profile_hint),
            LoginStatus::Guest => {
                // Guest access leaves this profile locked on purpose
                if let Err(e) = self.store.reset() {
                    tracing::error!("Failed to lock session for guest login: {}", e);
                }
                tracing::info!("Login resolved to guest mode");
                Outcome::Guest
            }
            LoginStatus::Other(status) => {
                tracing::info!(status = %status, "Login rejected");
                Outcome::failure(GateError::InvalidCredential)
            }
        }
    }

    fn complete_login(&self, response: LoginResponse, profile_hint: &str) -> Outcome {
        let Some(token) = response.token.filter(|t| !t.is_empty()) else {
            tracing::warn!("Login succeeded without a token");
            return Outcome::failure(GateError::MissingToken);
        };

        let bound_profile = response
            .profile_launched
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| profile_hint.to_string());
        let expiry = Utc::now() + self.ttl;

        let patch = SessionPatch::unlock(token.clone(), expiry).bound_profile(bound_profile.clone());
        if let Err(e) = self.store.write(patch) {
            tracing::error!("Failed to record login: {}", e);
            return Outcome::failure(e.into());
        }

        tracing::info!(
            profile = %bound_profile,
            different_profile = response.different_profile,
            "Authentication successful"
        );

        Outcome::Success {
            token,
            bound_profile,
            different_profile: response.different_profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_store, FakeAuthService, Mode};
    use serde_json::json;

    fn flow(service: &Arc<FakeAuthService>, store: &SessionStore) -> AuthFlow {
        AuthFlow::new(
            service.clone(),
            store.clone(),
            Duration::from_millis(100),
            chrono::Duration::hours(24),
        )
    }

    fn password(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[tokio::test]
    async fn test_empty_password_makes_no_request() {
        let service = FakeAuthService::new();
        let store = memory_store();

        let outcome = flow(&service, &store).submit(&password(""), "Default").await;

        assert!(matches!(
            outcome,
            Outcome::Failure {
                kind: ErrorKind::InvalidCredential,
                ..
            }
        ));
        assert!(outcome.clears_password());
        assert_eq!(outcome.message(), "Please enter a password.");
        assert_eq!(FakeAuthService::calls(&service.login_calls), 0);
    }

    #[tokio::test]
    async fn test_success_binds_server_profile() {
        let service = FakeAuthService::new();
        service.set_login(json!({
            "status": "success",
            "token": "abc",
            "profile_launched": "Work"
        }));
        let store = memory_store();

        let outcome = flow(&service, &store)
            .submit(&password("hunter2"), "Default")
            .await;

        assert_eq!(
            outcome,
            Outcome::Success {
                token: "abc".to_string(),
                bound_profile: "Work".to_string(),
                different_profile: false,
            }
        );
        assert_eq!(
            service.last_login(),
            Some(("hunter2".to_string(), "Default".to_string()))
        );

        let session = store.read();
        assert!(!session.locked);
        assert_eq!(session.token.as_deref(), Some("abc"));
        assert_eq!(session.bound_profile, "Work");
        let expiry = session.token_expiry.unwrap();
        assert!(expiry > Utc::now() + chrono::Duration::hours(23));
    }

    #[tokio::test]
    async fn test_success_without_profile_keeps_hint() {
        let service = FakeAuthService::new();
        service.set_login(json!({"status": "success", "token": "abc"}));
        let store = memory_store();

        flow(&service, &store)
            .submit(&password("pw"), "Profile 3")
            .await;
        assert_eq!(store.read().bound_profile, "Profile 3");
    }

    #[tokio::test]
    async fn test_success_without_token_is_server_error() {
        let service = FakeAuthService::new();
        service.set_login(json!({"status": "success"}));
        let store = memory_store();

        let outcome = flow(&service, &store).submit(&password("pw"), "Default").await;

        assert!(matches!(
            outcome,
            Outcome::Failure {
                kind: ErrorKind::ServerError,
                ..
            }
        ));
        assert!(store.read().locked);
    }

    #[tokio::test]
    async fn test_guest_locks_session() {
        let service = FakeAuthService::new();
        service.set_login(json!({"status": "guest"}));
        let store = memory_store();
        store
            .write(SessionPatch::unlock(
                "old",
                Utc::now() + chrono::Duration::hours(1),
            ))
            .unwrap();

        let outcome = flow(&service, &store).submit(&password("pw"), "Default").await;

        assert_eq!(outcome, Outcome::Guest);
        assert!(store.read().locked);
        assert!(store.read().token.is_none());
    }

    #[tokio::test]
    async fn test_unknown_status_is_generic_failure() {
        let service = FakeAuthService::new();
        service.set_login(json!({"status": "denied", "message": "no such profile"}));
        let store = memory_store();

        let outcome = flow(&service, &store).submit(&password("pw"), "Default").await;

        assert_eq!(
            outcome.message(),
            "Authentication failed. Please try again or contact support."
        );
        assert!(!outcome.message().contains("profile"));
    }

    #[tokio::test]
    async fn test_transport_failures_surface_retryable_message() {
        for (mode, kind) in [
            (Mode::Down, ErrorKind::NetworkUnavailable),
            (Mode::Hang, ErrorKind::NetworkUnavailable),
            (Mode::Status(500), ErrorKind::ServerError),
        ] {
            let service = FakeAuthService::new();
            service.set_mode(mode);
            let store = memory_store();

            let outcome = flow(&service, &store).submit(&password("pw"), "Default").await;

            match outcome {
                Outcome::Failure { kind: got, message } => {
                    assert_eq!(got, kind, "{mode:?}");
                    assert_eq!(message, "Error communicating with auth service. Is it running?");
                }
                other => panic!("{mode:?} produced {other:?}"),
            }
            assert!(store.read().locked);
        }
    }

    #[test]
    fn test_outcome_serialization_hides_token() {
        let outcome = Outcome::Success {
            token: "abc".to_string(),
            bound_profile: "Work".to_string(),
            different_profile: true,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["bound_profile"], "Work");
        assert!(value.get("token").is_none());
    }
}
