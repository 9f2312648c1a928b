//! Session store: who, if anyone, is logged in.
//!
//! The store owns the in-memory [`Session`] and mirrors it into a
//! [`KeyValueStore`] under two fixed keys, [`TOKEN_KEY`] and [`USER_KEY`].
//! There are exactly two write entry points, [`SessionStore::set_session`] and
//! [`SessionStore::clear_session`]; everything else only reads.
//!
//! Readers (API client, route guard, views) receive the store through an
//! `Arc<SessionStore>` rather than reaching for a global.

pub mod storage;

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::errors::SessionError;
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Storage key holding the opaque bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-serialized [`UserProfile`].
pub const USER_KEY: &str = "user";

/// Profile of the logged-in user as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

pub(crate) fn default_role() -> String {
    "USER".to_string()
}

impl UserProfile {
    /// Name for greetings; falls back to the email when the name is blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Authenticated identity of this client.
///
/// `user` may be `None` when the backend issued a token without profile
/// fields; a `user` is never present without a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: Option<UserProfile>,
}

pub struct SessionStore {
    storage: Box<dyn KeyValueStore>,
    state: RwLock<Option<Session>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionStore {
    /// Open the store and hydrate it from durable storage.
    pub fn open(storage: impl KeyValueStore + 'static) -> Result<Self, SessionError> {
        let storage: Box<dyn KeyValueStore> = Box::new(storage);
        let session = hydrate(storage.as_ref())?;
        Ok(Self {
            storage,
            state: RwLock::new(session),
        })
    }

    /// Store a new session, replacing any previous one.
    ///
    /// Both keys are written before the in-memory state changes. If the second
    /// write fails, both keys are removed and the store ends logged out.
    pub fn set_session(&self, token: &str, user: Option<UserProfile>) -> Result<(), SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let user_json = user
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(SessionError::Serialize)?;

        let mut state = self.state.write().map_err(|_| SessionError::LockPoisoned)?;

        let persisted = self.storage.set(TOKEN_KEY, token).and_then(|()| match &user_json {
            Some(json) => self.storage.set(USER_KEY, json),
            None => self.storage.remove(USER_KEY),
        });

        if let Err(e) = persisted {
            let _ = self.storage.remove(TOKEN_KEY);
            let _ = self.storage.remove(USER_KEY);
            *state = None;
            tracing::error!(error = %e, "failed to persist session, storage cleared");
            return Err(e);
        }

        tracing::info!(
            user = user.as_ref().map(|u| u.email.as_str()).unwrap_or("<no profile>"),
            "session stored"
        );
        *state = Some(Session {
            token: token.to_string(),
            user,
        });
        Ok(())
    }

    /// Remove both keys. Safe to call when already logged out.
    ///
    /// The token is removed first, with one retry. If it cannot be removed the
    /// in-memory session is kept so memory and storage still agree. Once the
    /// token is gone a leftover `user` entry is harmless: hydration discards
    /// a profile without a token.
    pub fn clear_session(&self) -> Result<(), SessionError> {
        let mut state = self.state.write().map_err(|_| SessionError::LockPoisoned)?;
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to remove stored token, retrying");
            self.storage.remove(TOKEN_KEY)?;
        }
        let user_result = self.storage.remove(USER_KEY);
        if state.take().is_some() {
            tracing::info!("session cleared");
        }
        user_result
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.read(|s| s.and_then(|s| s.user.clone()))
    }

    pub fn token(&self) -> Option<String> {
        self.read(|s| s.map(|s| s.token.clone()))
    }

    pub fn session(&self) -> Option<Session> {
        self.read(|s| s.cloned())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.is_some())
    }

    fn read<T>(&self, f: impl FnOnce(Option<&Session>) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_ref())
    }
}

/// Rebuild the session from storage, repairing entries that break the
/// token/user pairing.
fn hydrate(storage: &dyn KeyValueStore) -> Result<Option<Session>, SessionError> {
    let token = storage
        .get(TOKEN_KEY)?
        .filter(|t| !t.trim().is_empty());
    let raw_user = storage.get(USER_KEY)?;

    let Some(token) = token else {
        if raw_user.is_some() {
            tracing::warn!("stored user profile without a token, discarding");
            storage.remove(USER_KEY)?;
        }
        storage.remove(TOKEN_KEY)?;
        return Ok(None);
    };

    let user = match raw_user {
        None => None,
        Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "stored user profile unreadable, keeping token only");
                storage.remove(USER_KEY)?;
                None
            }
        },
    };

    Ok(Some(Session { token, user }))
}
