// src/session.rs

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::error::{io_context, Result, StaffdeskError};

pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";

/// Named key-value storage the session lives in. The terminal shell keeps it
/// in a JSON file; tests and embedders can keep it in memory.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| io_context(std::io::Error::other("poisoned"), "Memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Key-value store persisted as a flat JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let json_string = fs::read_to_string(&self.path)
            .map_err(|e| io_context(e, format!("Failed to read session file: {:?}", self.path)))?;
        if json_string.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&json_string)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(|e| {
                    io_context(e, format!("Failed to remove session file: {:?}", self.path))
                })?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    io_context(
                        e,
                        format!("Failed to create directory for session file: {:?}", parent),
                    )
                })?;
            }
        }

        let json_string = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json_string)
            .map_err(|e| io_context(e, format!("Failed to write session file: {:?}", self.path)))
    }

    /// Entries to rewrite from. An unreadable file is dropped so the next
    /// login or logout replaces it.
    fn load_or_discard(&self) -> Result<BTreeMap<String, String>> {
        match self.load() {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!("Session file {:?} is unreadable, starting fresh: {}", self.path, e);
                self.save(&BTreeMap::new())?;
                Ok(BTreeMap::new())
            }
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load_or_discard()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.load_or_discard()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// The current credential. Cloning shares the underlying store, so the API
/// client and the route guard always observe the same token.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(path)))
    }

    /// Stores a new token, superseding any previous one.
    pub fn set_token(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(StaffdeskError::MissingToken);
        }
        self.store.set(TOKEN_KEY, token)?;
        info!("Session token stored.");
        Ok(())
    }

    pub fn get_token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn set_user_id(&self, user_id: &str) -> Result<()> {
        self.store.set(USER_ID_KEY, user_id)
    }

    pub fn clear_user_id(&self) -> Result<()> {
        self.store.remove(USER_ID_KEY)
    }

    pub fn user_id(&self) -> Result<Option<String>> {
        self.store.get(USER_ID_KEY)
    }

    /// Removes the token and cached identity fields.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_ID_KEY)?;
        info!("Session cleared.");
        Ok(())
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.get_token()?.is_some())
    }
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

/// Expiry of a JWT-shaped token, read from its `exp` claim. Opaque tokens
/// and tokens without the claim have no local expiry.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let decoded = BASE64_URL.decode(payload.trim_end_matches('=')).ok()?;
    let claim: ExpiryClaim = serde_json::from_slice(&decoded).ok()?;
    let expires_at = Utc.timestamp_opt(claim.exp?, 0).single();
    debug!("Token carries expiry claim: {:?}", expires_at);
    expires_at
}

pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    match token_expiry(token) {
        Some(expires_at) => {
            let expired = now >= expires_at;
            if expired {
                warn!("Stored token expired at {}", expires_at);
            }
            expired
        }
        None => false,
    }
}
