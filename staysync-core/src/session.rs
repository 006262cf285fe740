//! Session persistence (auth token and logged-in user).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{StayResult, SyncError};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Key/value storage for session data.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> StayResult<()>;
    fn clear(&self) -> StayResult<()>;
}

/// The user the backend returned at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(deserialize_with = "crate::property::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Typed view over a [`SessionStore`].
pub struct Session<'a> {
    store: &'a dyn SessionStore,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a dyn SessionStore) -> Self {
        Session { store }
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// A stored user that no longer deserializes is treated as logged out.
    pub fn user(&self) -> Option<SessionUser> {
        let raw = self.store.get(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn login(&self, token: &str, user: &SessionUser) -> StayResult<()> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &serde_json::to_string(user)?)
    }

    pub fn logout(&self) -> StayResult<()> {
        self.store.clear()
    }
}

/// In-process store, used by tests and one-shot runs.
#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        if let Ok(mut values) = store.values.lock() {
            values.insert(TOKEN_KEY.to_string(), token.to_string());
        }
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StayResult<()> {
        self.values
            .lock()
            .map_err(|_| SyncError::Session("session store poisoned".into()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> StayResult<()> {
        self.values
            .lock()
            .map_err(|_| SyncError::Session("session store poisoned".into()))?
            .clear();
        Ok(())
    }
}

/// JSON object on disk, by default `~/.config/staysync/session.json`.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        FileSessionStore { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    // A missing or unreadable file is an empty session.
    fn read(&self) -> HashMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write(&self, values: &HashMap<String, String>) -> StayResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Session(format!("Could not create session directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, content)
            .map_err(|e| SyncError::Session(format!("Could not write session file: {e}")))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> StayResult<()> {
        let mut values = self.read();
        values.insert(key.to_string(), value.to_string());
        self.write(&values)
    }

    fn clear(&self) -> StayResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
