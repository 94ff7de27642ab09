//! Session Store
//!
//! Sole owner of the session. Writes are serialized behind one lock and
//! persisted before the new snapshot becomes visible to readers.

use parking_lot::RwLock;
use std::sync::Arc;

use lockgate_storage::{Database, SettingChange};

use crate::session::{keys, Session, SessionPatch};
use crate::Result;

pub struct SessionStore {
    /// Current snapshot; the write guard is the single serialization point
    state: Arc<RwLock<Session>>,
    /// Database for persistence
    db: Database,
}

impl SessionStore {
    /// Load the persisted session. An unreadable record is treated as a
    /// locked fresh install rather than an error.
    pub fn open(db: Database) -> Self {
        let session = match Self::load(&db) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to load session state, starting locked: {}", e);
                Session::initial()
            }
        };

        tracing::debug!(
            locked = session.locked,
            profile = %session.bound_profile,
            initialized = session.initialized,
            "Loaded session state"
        );

        Self {
            state: Arc::new(RwLock::new(session)),
            db,
        }
    }

    fn load(db: &Database) -> Result<Session> {
        let values = db.get_settings(&keys::ALL)?;
        Session::from_settings(&values)
    }

    /// Current snapshot. Never blocks on I/O and never fails.
    pub fn read(&self) -> Session {
        self.state.read().clone()
    }

    /// Merge `patch` into the session and persist it.
    pub fn write(&self, patch: SessionPatch) -> Result<Session> {
        let mut guard = self.state.write();
        self.commit(&mut guard, &patch)
    }

    /// Compare-and-write: `decide` sees the session under the write lock and
    /// returns the patch to apply, or `None` to leave it untouched.
    pub fn update<F>(&self, decide: F) -> Result<Option<Session>>
    where
        F: FnOnce(&Session) -> Option<SessionPatch>,
    {
        let mut guard = self.state.write();
        match decide(&guard) {
            Some(patch) => self.commit(&mut guard, &patch).map(Some),
            None => Ok(None),
        }
    }

    /// Lock the session and drop the credential.
    pub fn reset(&self) -> Result<Session> {
        let session = self.write(SessionPatch::lock())?;
        tracing::info!("Session locked");
        Ok(session)
    }

    /// Record that the first-run banner was shown.
    /// Returns true only for the call that flipped the flag.
    pub fn mark_initialized(&self) -> Result<bool> {
        let mut guard = self.state.write();
        if guard.initialized {
            return Ok(false);
        }
        self.commit(&mut guard, &SessionPatch::new().mark_initialized())?;
        Ok(true)
    }

    fn commit(&self, current: &mut Session, patch: &SessionPatch) -> Result<Session> {
        let next = patch.apply_to(current);
        let changes = match diff(current, &next) {
            Ok(changes) => changes,
            Err(e) => {
                *current = current.locked_copy();
                return Err(e);
            }
        };

        if changes.is_empty() {
            return Ok(next);
        }

        if let Err(e) = self.db.apply_settings(&changes) {
            // The new state is not durable; never leave an unlocked snapshot behind
            tracing::error!("Failed to persist session, locking in memory: {}", e);
            *current = current.locked_copy();
            return Err(e.into());
        }

        *current = next.clone();
        Ok(next)
    }
}

fn diff(old: &Session, new: &Session) -> Result<Vec<SettingChange>> {
    let before = old.to_settings()?;
    let after = new.to_settings()?;

    Ok(before
        .into_iter()
        .zip(after)
        .filter(|((_, a), (_, b))| a != b)
        .map(|(_, (key, value))| match value {
            Some(value) => SettingChange::put(key, value),
            None => SettingChange::remove(key),
        })
        .collect())
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            db: self.db.clone(),
        }
    }
}
