//! Persistent key-value storage and the session cache built on it.
//!
//! The file backend keeps every key in one JSON object at
//! `<home>/storage.json`, written with restricted permissions (0600).
//! Tokens are never logged.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::auth::AuthError;
use crate::config::paths;
use crate::session::{Credentials, User};

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key holding the JSON-encoded user profile.
pub const USER_KEY: &str = "auth_user";

/// Durable string-to-string storage.
///
/// # Errors
/// Implementations return an error when the backing medium fails.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Writes several keys. Backends that can do it in one write override this.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

// ============================================================================
// FileStore
// ============================================================================

/// JSON-file backed store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the switchboard home.
    pub fn in_home() -> Self {
        Self::new(paths::storage_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read storage from {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse storage from {}", self.path.display()))
    }

    /// Read-modify-write. A corrupt file is replaced rather than blocking writes.
    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut map = self.read_map().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "discarding unreadable storage: {e:#}");
            BTreeMap::new()
        });
        f(&mut map);
        self.write_map(&map)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(map).context("Failed to serialize storage")?;

        let tmp_path = self.path.with_extension("json.tmp");
        write_private(&tmp_path, contents.as_bytes())?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

/// Writes `contents` to `path`, readable only by the owner on unix.
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        // `mode` only applies on creation; a leftover file keeps its bits.
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
        file.write_all(contents)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_all(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.remove_all(&[key])
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.modify(|map| {
            for (key, value) in entries {
                map.insert((*key).to_string(), (*value).to_string());
            }
        })
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.modify(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

// ============================================================================
// SessionCache
// ============================================================================

/// Saves and restores the token/user pair.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCache").finish_non_exhaustive()
    }
}

impl SessionCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persists the pair in a single store write.
    ///
    /// # Errors
    /// Returns an error if the user cannot be encoded or the store fails.
    pub fn save(&self, token: &str, user: &User) -> Result<()> {
        let user_json = serde_json::to_string(user).context("Failed to encode user profile")?;
        self.store
            .set_all(&[(TOKEN_KEY, token), (USER_KEY, user_json.as_str())])
    }

    /// Loads the stored pair, treating unreadable data as no session.
    pub fn load(&self) -> Option<Credentials> {
        match self.try_load() {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("ignoring stored session: {e}");
                None
            }
        }
    }

    /// Loads the stored pair, reporting corrupt data instead of hiding it.
    ///
    /// # Errors
    /// Returns `MalformedStoredData` when the store fails or the profile is not valid JSON.
    pub fn try_load(&self) -> Result<Option<Credentials>, AuthError> {
        let read = |key: &str| {
            self.store
                .get(key)
                .map_err(|e| AuthError::MalformedStoredData(format!("{e:#}")))
        };

        let (Some(token), Some(user_text)) = (read(TOKEN_KEY)?, read(USER_KEY)?) else {
            debug!("no stored session");
            return Ok(None);
        };

        let user: User = serde_json::from_str(&user_text)
            .map_err(|e| AuthError::MalformedStoredData(format!("{USER_KEY}: {e}")))?;

        Ok(Some(Credentials { token, user }))
    }

    /// Removes both keys.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn clear(&self) -> Result<()> {
        self.store.remove_all(&[TOKEN_KEY, USER_KEY])
    }
}
