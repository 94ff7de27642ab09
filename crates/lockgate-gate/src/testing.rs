//! In-process stand-in for the auth service

use async_trait::async_trait;
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lockgate_remote::{
    AuthService, HealthResponse, LoginResponse, ProfilesResponse, RemoteError, RemoteProfile,
    VerifyResponse,
};
use lockgate_session::SessionStore;
use lockgate_storage::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Up,
    Down,
    Hang,
    Status(u16),
}

pub(crate) struct FakeAuthService {
    health_mode: Mutex<Mode>,
    mode: Mutex<Mode>,
    health_status: Mutex<String>,
    login_body: Mutex<serde_json::Value>,
    valid_tokens: Mutex<Vec<String>>,
    profiles: Mutex<Vec<RemoteProfile>>,
    last_login: Mutex<Option<(String, String)>>,
    pub health_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
}

impl FakeAuthService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            health_mode: Mutex::new(Mode::Up),
            mode: Mutex::new(Mode::Up),
            health_status: Mutex::new("healthy".to_string()),
            login_body: Mutex::new(serde_json::json!({"status": "failed"})),
            valid_tokens: Mutex::new(Vec::new()),
            profiles: Mutex::new(Vec::new()),
            last_login: Mutex::new(None),
            health_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_health_mode(&self, mode: Mode) {
        *self.health_mode.lock() = mode;
    }

    /// Transport behavior of every endpoint except `/health`.
    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock() = mode;
    }

    pub fn set_health_status(&self, status: &str) {
        *self.health_status.lock() = status.to_string();
    }

    pub fn set_login(&self, body: serde_json::Value) {
        *self.login_body.lock() = body;
    }

    pub fn accept_token(&self, token: &str) {
        self.valid_tokens.lock().push(token.to_string());
    }

    pub fn set_profiles(&self, profiles: Vec<RemoteProfile>) {
        *self.profiles.lock() = profiles;
    }

    /// `(password, profile)` of the most recent login request.
    pub fn last_login(&self) -> Option<(String, String)> {
        self.last_login.lock().clone()
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn transport(mode: Mode) -> Result<(), RemoteError> {
        match mode {
            Mode::Up => Ok(()),
            Mode::Down => Err(RemoteError::Unreachable("connection refused".to_string())),
            Mode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(RemoteError::Timeout)
            }
            Mode::Status(code) => Err(RemoteError::Status(code)),
        }
    }
}

#[async_trait]
impl AuthService for FakeAuthService {
    async fn health(&self) -> lockgate_remote::Result<HealthResponse> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let mode = *self.health_mode.lock();
        Self::transport(mode).await?;
        Ok(HealthResponse {
            status: self.health_status.lock().clone(),
        })
    }

    async fn profiles(&self) -> lockgate_remote::Result<ProfilesResponse> {
        let mode = *self.mode.lock();
        Self::transport(mode).await?;
        Ok(ProfilesResponse {
            chrome_profiles: self.profiles.lock().clone(),
            app_profiles: Vec::new(),
        })
    }

    async fn login(
        &self,
        password: &SecretString,
        profile: &str,
    ) -> lockgate_remote::Result<LoginResponse> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_login.lock() = Some((password.expose_secret().to_string(), profile.to_string()));
        let mode = *self.mode.lock();
        Self::transport(mode).await?;
        let body = self.login_body.lock().clone();
        serde_json::from_value(body).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn verify(&self, token: &str) -> lockgate_remote::Result<VerifyResponse> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let mode = *self.mode.lock();
        Self::transport(mode).await?;
        Ok(VerifyResponse {
            valid: self.valid_tokens.lock().iter().any(|t| t == token),
            profile: None,
        })
    }
}

pub(crate) fn memory_store() -> SessionStore {
    SessionStore::open(Database::open_in_memory().expect("in-memory database"))
}
