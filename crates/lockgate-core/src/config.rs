//! Gatekeeper configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use lockgate_gate::GateSettings;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Base address of the authentication service
    pub service_url: String,
    /// Canonical address of the authentication surface
    pub auth_surface_url: String,
    /// Targets that are never gated
    pub exempt_prefixes: Vec<String>,
    pub health_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub login_ttl_hours: i64,
    pub verify_ttl_hours: i64,
}

impl Config {
    pub const DEFAULT_SERVICE_URL: &'static str = "http://127.0.0.1:27843";

    pub fn new(data_dir: PathBuf) -> Self {
        let gate = GateSettings::default();

        Self {
            database_path: data_dir.join("lockgate.db"),
            service_url: Self::DEFAULT_SERVICE_URL.to_string(),
            auth_surface_url: gate.auth_surface_url,
            exempt_prefixes: gate.exempt_prefixes,
            health_timeout_ms: gate.health_timeout.as_millis() as u64,
            request_timeout_ms: gate.request_timeout.as_millis() as u64,
            login_ttl_hours: gate.login_ttl.num_hours(),
            verify_ttl_hours: gate.verify_ttl.num_hours(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("LockGate"))
            .unwrap_or_else(|| PathBuf::from(".lockgate"))
    }

    /// Defaults overlaid with `LOCKGATE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("LOCKGATE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(Self::data_dir);
        let mut config = Self::new(data_dir);

        if let Some(url) = lookup("LOCKGATE_SERVICE_URL") {
            config.service_url = url;
        }
        if let Some(url) = lookup("LOCKGATE_AUTH_SURFACE") {
            config.auth_surface_url = url;
        }
        if let Some(raw) = lookup("LOCKGATE_HEALTH_TIMEOUT_MS") {
            config.health_timeout_ms = parse_number("LOCKGATE_HEALTH_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("LOCKGATE_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = parse_number("LOCKGATE_REQUEST_TIMEOUT_MS", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.service_url()?;

        self.auth_surface_url()?;
        if self.health_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(CoreError::Config("timeouts must be positive".to_string()));
        }
        if self.login_ttl_hours <= 0 || self.verify_ttl_hours <= 0 {
            return Err(CoreError::Config("token lifetimes must be positive".to_string()));
        }

        Ok(())
    }

    pub fn service_url(&self) -> Result<Url> {
        let url = Url::parse(&self.service_url)
            .map_err(|e| CoreError::Config(format!("service URL {}: {}", self.service_url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CoreError::Config(format!(
                "service URL must be http(s), got {other}"
            ))),
        }
    }

    /// The auth surface must be an absolute URL with a host; its origin
    /// is what the gate exempts.
    pub fn auth_surface_url(&self) -> Result<Url> {
        let url = Url::parse(&self.auth_surface_url).map_err(|e| {
            CoreError::Config(format!("auth surface URL {}: {}", self.auth_surface_url, e))
        })?;

        if url.host_str().is_none() {
            return Err(CoreError::Config(format!(
                "auth surface URL {} has no host",
                self.auth_surface_url
            )));
        }

        Ok(url)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn gate_settings(&self) -> GateSettings {
        GateSettings {
            auth_surface_url: self.auth_surface_url.clone(),
            exempt_prefixes: self.exempt_prefixes.clone(),
            health_timeout: self.health_timeout(),
            request_timeout: self.request_timeout(),
            login_ttl: chrono::Duration::hours(self.login_ttl_hours),
            verify_ttl: chrono::Duration::hours(self.verify_ttl_hours),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Config(format!("{key} must be a number, got {raw:?}")))
}

mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
