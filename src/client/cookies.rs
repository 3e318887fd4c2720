//! Credential jar
//!
//! Cookie storage for the HTTP client. The identity server's session cookies
//! are written to a JSON file beside the session database, so a restarted
//! client still holds the credentials its persisted identity refers to.
//! The file is readable by the owner only.

use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, MutexGuard};

use crate::client::error::PersistenceError;

#[derive(Clone)]
pub struct CredentialJar {
    store: Arc<CookieStoreMutex>,
    path: Option<PathBuf>,
}

impl fmt::Debug for CredentialJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialJar")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl CredentialJar {
    /// Jar that lives as long as the process
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(CookieStoreMutex::new(CookieStore::default())),
            path: None,
        }
    }

    /// Load the jar at `path`, or start empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let store = match std::fs::File::open(&path) {
            Ok(file) => cookie_store::serde::json::load(BufReader::new(file))
                .map_err(|e| PersistenceError::Corrupt(format!("cookie jar: {}", e)))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => CookieStore::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            store: Arc::new(CookieStoreMutex::new(store)),
            path: Some(path),
        })
    }

    /// Store handed to `reqwest::ClientBuilder::cookie_provider`
    pub fn provider(&self) -> Arc<CookieStoreMutex> {
        self.store.clone()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Drop every stored cookie. Call [`save`](Self::save) to persist.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Write the jar to its file. No-op for an in-memory jar.
    pub fn save(&self) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut buffer = Vec::new();
        {
            let store = self.lock();
            cookie_store::serde::json::save(&store, &mut buffer)
                .map_err(|e| PersistenceError::Corrupt(format!("cookie jar: {}", e)))?;
        }
        write_owner_only(path, &buffer)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, CookieStore> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Replace `path` atomically with a 0600 file holding `bytes`
fn write_owner_only(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let staging = path.with_extension("tmp");
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&staging)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()?;
    std::fs::rename(&staging, path)
}
