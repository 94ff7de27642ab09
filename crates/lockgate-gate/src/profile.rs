//! Profile identity detection
//!
//! Maps the account signed into the local browser profile onto the
//! profile names the auth service knows about.

use lockgate_remote::{AuthService, RemoteProfile};
use lockgate_session::{SessionPatch, SessionStore};

use crate::Result;

/// Label for a context with no signed-in account.
pub const GUEST_PROFILE: &str = "Guest/Default";
/// Label for a signed-in account the service does not list.
pub const UNKNOWN_SIGNED_IN: &str = "Unknown-signed-in";

#[derive(Debug, Clone)]
pub struct ProfileIdentifier {
    /// Account e-mail of the local context; empty when anonymous
    local_identity: String,
}

impl ProfileIdentifier {
    pub fn new(local_identity: impl Into<String>) -> Self {
        Self {
            local_identity: local_identity.into(),
        }
    }

    /// Guest and unrecognized accounts get distinct labels; support
    /// tooling tells them apart.
    pub fn resolve(&self, remote_profiles: &[RemoteProfile]) -> String {
        if self.local_identity.is_empty() {
            return GUEST_PROFILE.to_string();
        }

        remote_profiles
            .iter()
            .find(|p| p.email.as_deref() == Some(self.local_identity.as_str()))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNKNOWN_SIGNED_IN.to_string())
    }

    /// Fetch the service's profile list, resolve, and bind the result to
    /// the session. On failure the stored profile is left as it was.
    pub async fn detect(&self, service: &dyn AuthService, store: &SessionStore) -> Result<String> {
        let profiles = service.profiles().await?;
        let profile = self.resolve(&profiles.chrome_profiles);

        store.write(SessionPatch::new().bound_profile(profile.clone()))?;

        tracing::info!(profile = %profile, "Detected current profile");

        Ok(profile)
    }
}
