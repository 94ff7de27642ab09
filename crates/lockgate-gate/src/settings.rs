//! Gate policy knobs

use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Canonical address of the authentication surface
    pub auth_surface_url: String,
    /// Targets starting with any of these are never gated
    pub exempt_prefixes: Vec<String>,
    /// Hard limit for the liveness probe
    pub health_timeout: Duration,
    /// Limit for login, verify and profile requests
    pub request_timeout: Duration,
    /// Local validity granted by a fresh login
    pub login_ttl: chrono::Duration,
    /// Local validity granted by a successful remote verification
    pub verify_ttl: chrono::Duration,
}

impl GateSettings {
    /// True for the auth surface (any page on its origin) and for
    /// internal/privileged pages.
    pub fn is_exempt(&self, target: &str) -> bool {
        self.is_auth_surface(target)
            || self
                .exempt_prefixes
                .iter()
                .any(|prefix| target.starts_with(prefix.as_str()))
    }

    /// Same scheme, host and port as the auth surface. Unparseable
    /// targets never match.
    pub fn is_auth_surface(&self, target: &str) -> bool {
        let (Ok(surface), Ok(target)) = (Url::parse(&self.auth_surface_url), Url::parse(target))
        else {
            return false;
        };

        surface.host_str().is_some()
            && surface.scheme() == target.scheme()
            && surface.host_str() == target.host_str()
            && surface.port_or_known_default() == target.port_or_known_default()
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            auth_surface_url: "chrome-extension://lockgate/security-verification.html".to_string(),
            exempt_prefixes: vec!["chrome://".to_string(), "about:".to_string()],
            health_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(8),
            login_ttl: chrono::Duration::hours(24),
            verify_ttl: chrono::Duration::hours(12),
        }
    }
}
