//! Session data structure

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::fmt;

use crate::error::SessionError;
use crate::Result;

/// Profile label used before any detection or login has bound one.
pub const DEFAULT_PROFILE: &str = "Default";

/// Keys of the persisted session record.
pub mod keys {
    pub const AUTHENTICATED: &str = "profileAuthenticated";
    pub const TOKEN: &str = "authToken";
    pub const TOKEN_EXPIRY: &str = "tokenExpiry";
    pub const PROFILE_NAME: &str = "currentProfileName";
    pub const INITIALIZED: &str = "extensionInitialized";

    pub const ALL: [&str; 5] = [
        AUTHENTICATED,
        TOKEN,
        TOKEN_EXPIRY,
        PROFILE_NAME,
        INITIALIZED,
    ];
}

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Every gated context is redirected while this is set
    pub locked: bool,
    /// Credential issued by the remote service on login
    pub token: Option<String>,
    /// Local estimate of token validity; `None` means verify remotely
    pub token_expiry: Option<DateTime<Utc>>,
    /// Identity label the session was authenticated for
    pub bound_profile: String,
    /// Set once the first-run banner has been shown
    pub initialized: bool,
}

impl Session {
    /// State of a fresh install: locked, no credential, banner pending.
    pub fn initial() -> Self {
        Self {
            locked: true,
            token: None,
            token_expiry: None,
            bound_profile: DEFAULT_PROFILE.to_string(),
            initialized: false,
        }
    }

    /// True when the cached expiry is strictly after `now`.
    /// An expiry equal to `now` is already stale.
    pub fn token_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.token_expiry.is_some_and(|expiry| now < expiry)
    }

    /// Authenticated from the local cache alone, without asking the service.
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        !self.locked && self.token.is_some() && self.token_fresh_at(now)
    }

    /// Unlocked with a cached token the local expiry can no longer vouch
    /// for. A locked session never qualifies; only a login unlocks it.
    pub fn needs_verification_at(&self, now: DateTime<Utc>) -> bool {
        !self.locked && self.token.is_some() && !self.token_fresh_at(now)
    }

    pub(crate) fn from_settings(values: &HashMap<String, String>) -> Result<Self> {
        let mut session = Session::initial();

        if let Some(raw) = values.get(keys::AUTHENTICATED) {
            let authenticated: bool = serde_json::from_str(raw)?;
            session.locked = !authenticated;
        }
        if let Some(raw) = values.get(keys::TOKEN) {
            let token: Option<String> = serde_json::from_str(raw)?;
            session.token = token.filter(|t| !t.is_empty());
        }
        if let Some(raw) = values.get(keys::TOKEN_EXPIRY) {
            let millis: Option<i64> = serde_json::from_str(raw)?;
            session.token_expiry = match millis {
                Some(ms) => Some(Utc.timestamp_millis_opt(ms).single().ok_or_else(|| {
                    SessionError::InvalidValue {
                        key: keys::TOKEN_EXPIRY,
                        reason: format!("{ms} is out of range"),
                    }
                })?),
                None => None,
            };
        }
        if let Some(raw) = values.get(keys::PROFILE_NAME) {
            let profile: String = serde_json::from_str(raw)?;
            if !profile.is_empty() {
                session.bound_profile = profile;
            }
        }
        if let Some(raw) = values.get(keys::INITIALIZED) {
            session.initialized = serde_json::from_str(raw)?;
        }

        Ok(session.enforce_invariants())
    }

    /// Encoded form of every persisted key; `None` means the key is absent.
    pub(crate) fn to_settings(&self) -> Result<Vec<(&'static str, Option<String>)>> {
        Ok(vec![
            (
                keys::AUTHENTICATED,
                Some(serde_json::to_string(&!self.locked)?),
            ),
            (
                keys::TOKEN,
                self.token.as_ref().map(serde_json::to_string).transpose()?,
            ),
            (
                keys::TOKEN_EXPIRY,
                self.token_expiry
                    .map(|expiry| serde_json::to_string(&expiry.timestamp_millis()))
                    .transpose()?,
            ),
            (
                keys::PROFILE_NAME,
                Some(serde_json::to_string(&self.bound_profile)?),
            ),
            (
                keys::INITIALIZED,
                Some(serde_json::to_string(&self.initialized)?),
            ),
        ])
    }

    fn enforce_invariants(mut self) -> Self {
        if !self.locked && self.token.is_none() {
            tracing::warn!("Unlocked session without a token; forcing lock");
            self.locked = true;
        }
        if self.locked {
            if self.token.is_some() {
                // Left behind by an interrupted lock; the credential is void
                tracing::warn!("Locked session still holds a token; dropping it");
            }
            self.token = None;
            self.token_expiry = None;
        }
        self
    }

    pub(crate) fn locked_copy(&self) -> Self {
        Self {
            locked: true,
            token: None,
            token_expiry: None,
            ..self.clone()
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("locked", &self.locked)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("token_expiry", &self.token_expiry)
            .field("bound_profile", &self.bound_profile)
            .field("initialized", &self.initialized)
            .finish()
    }
}

/// A partial update, merged into the current session by `SessionStore`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    locked: Option<bool>,
    token: Option<Option<String>>,
    token_expiry: Option<Option<DateTime<Utc>>>,
    bound_profile: Option<String>,
    initialized: bool,
}

impl SessionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh credential and release the lock.
    pub fn unlock(token: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            locked: Some(false),
            token: Some(Some(token.into())),
            token_expiry: Some(Some(expiry)),
            ..Self::default()
        }
    }

    /// Keep the current token but trust it until `expiry`.
    pub fn refresh(expiry: DateTime<Utc>) -> Self {
        Self {
            locked: Some(false),
            token_expiry: Some(Some(expiry)),
            ..Self::default()
        }
    }

    /// Lock and forget the credential.
    pub fn lock() -> Self {
        Self {
            locked: Some(true),
            token: Some(None),
            token_expiry: Some(None),
            ..Self::default()
        }
    }

    pub fn bound_profile(mut self, profile: impl Into<String>) -> Self {
        self.bound_profile = Some(profile.into());
        self
    }

    /// `initialized` only ever moves from false to true.
    pub fn mark_initialized(mut self) -> Self {
        self.initialized = true;
        self
    }

    pub(crate) fn apply_to(&self, current: &Session) -> Session {
        let mut next = current.clone();

        if let Some(locked) = self.locked {
            next.locked = locked;
        }
        if let Some(token) = &self.token {
            next.token = token.clone();
        }
        if let Some(expiry) = self.token_expiry {
            next.token_expiry = expiry;
        }
        if let Some(profile) = &self.bound_profile {
            next.bound_profile = profile.clone();
        }
        if self.initialized {
            next.initialized = true;
        }

        next.enforce_invariants()
    }
}

impl fmt::Debug for SessionPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionPatch")
            .field("locked", &self.locked)
            .field(
                "token",
                &self.token.as_ref().map(|t| t.as_ref().map(|_| "<redacted>")),
            )
            .field("token_expiry", &self.token_expiry)
            .field("bound_profile", &self.bound_profile)
            .field("initialized", &self.initialized)
            .finish()
    }
}
