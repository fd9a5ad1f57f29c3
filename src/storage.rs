use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::Error;
use crate::types::RefreshToken;

/// Default key the refresh token is stored under.
pub const DEFAULT_REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Consumer-provided durable storage for the refresh token.
///
/// This is the only credential that survives a restart. Reads and writes
/// are synchronous, mirroring browser local storage.
///
/// # Example
///
/// ```rust,ignore
/// impl TokenStorage for Keychain {
///     fn load(&self) -> Result<Option<RefreshToken>, Error> {
///         Ok(self.get("refreshToken")?.map(RefreshToken::new))
///     }
///     fn store(&self, token: &RefreshToken) -> Result<(), Error> {
///         self.set("refreshToken", token.as_str())
///     }
///     fn remove(&self) -> Result<(), Error> {
///         self.delete("refreshToken")
///     }
/// }
/// ```
pub trait TokenStorage: Send + Sync + 'static {
    /// Read the stored refresh token, if any.
    fn load(&self) -> Result<Option<RefreshToken>, Error>;

    /// Overwrite the stored refresh token.
    fn store(&self, token: &RefreshToken) -> Result<(), Error>;

    /// Remove the stored refresh token. Removing an absent token is not an error.
    fn remove(&self) -> Result<(), Error>;
}

/// Process-local storage. Lost on restart; suited to tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<RefreshToken>>,
}

impl MemoryTokenStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: RefreshToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<RefreshToken>, Error> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, token: &RefreshToken) -> Result<(), Error> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), Error> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}

/// JSON key/value file, one string value per key.
///
/// Other keys in the file are preserved. Writes go through a sibling temp
/// file and a rename so a crash never leaves a truncated file behind.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    key: String,
    lock: Mutex<()>,
}

impl FileTokenStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: DEFAULT_REFRESH_TOKEN_KEY.into(),
            lock: Mutex::new(()),
        }
    }

    /// Override the key the token is stored under (default: `refreshToken`).
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, Error> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(storage_error(&self.path, "read", &e)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| storage_error(&self.path, "parse", &e))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| storage_error(parent, "create", &e))?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| storage_error(&self.path, "serialize", &e))?;

        let tmp = temp_path(&self.path);
        std::fs::write(&tmp, json).map_err(|e| storage_error(&tmp, "write", &e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| storage_error(&self.path, "replace", &e))
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<RefreshToken>, Error> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self
            .read_entries()?
            .remove(&self.key)
            .filter(|t| !t.is_empty())
            .map(RefreshToken::new))
    }

    fn store(&self, token: &RefreshToken) -> Result<(), Error> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        entries.insert(self.key.clone(), token.as_str().to_owned());
        self.write_entries(&entries)
    }

    fn remove(&self) -> Result<(), Error> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        if entries.remove(&self.key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

/// Sibling `.<file name>.tmp`, unique per target file.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(path.file_name().unwrap_or(path.as_os_str()));
    name.push(".tmp");
    path.with_file_name(name)
}

fn storage_error(path: &Path, action: &str, e: &dyn std::fmt::Display) -> Error {
    Error::Storage(format!("{action} {}: {e}", path.display()))
}
