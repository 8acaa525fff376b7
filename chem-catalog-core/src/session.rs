//! Client-persisted session state: the bearer token sent with every call.
//!
//! The token is read on each request so that a token saved by another
//! process (e.g. `chem-catalog session set-token`) is picked up without a
//! restart.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::error::Result;

pub const TOKEN_ENV: &str = "CHEM_CATALOG_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Clone)]
enum Backend {
    File(PathBuf),
    Memory(Arc<RwLock<Option<String>>>),
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    backend: Backend,
    honor_env: bool,
}

impl SessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::File(path.into()),
            honor_env: true,
        }
    }

    /// Session kept only in memory, ignoring the environment.
    pub fn in_memory(token: Option<&str>) -> Self {
        Self {
            backend: Backend::Memory(Arc::new(RwLock::new(token.map(str::to_string)))),
            honor_env: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File(path) => Some(path),
            Backend::Memory(_) => None,
        }
    }

    /// Current token; the `CHEM_CATALOG_TOKEN` variable wins over the file.
    pub fn token(&self) -> Result<Option<String>> {
        if self.honor_env {
            if let Ok(token) = std::env::var(TOKEN_ENV) {
                if !token.trim().is_empty() {
                    return Ok(Some(token.trim().to_string()));
                }
            }
        }

        match &self.backend {
            Backend::File(path) => {
                if !path.exists() {
                    debug!("no session file at {}", path.display());
                    return Ok(None);
                }
                let content = fs::read_to_string(path)?;
                let session: SessionFile = serde_json::from_str(&content)?;
                Ok(session.token.filter(|t| !t.trim().is_empty()))
            }
            Backend::Memory(token) => Ok(token.read().ok().and_then(|t| t.clone())),
        }
    }

    pub fn save_token(&self, token: &str) -> Result<()> {
        self.write(Some(token.trim().to_string()))?;
        info!("session token saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.write(None)?;
        info!("session token cleared");
        Ok(())
    }

    fn write(&self, token: Option<String>) -> Result<()> {
        match &self.backend {
            Backend::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                let content = serde_json::to_string_pretty(&SessionFile { token })?;
                fs::write(path, content)?;
            }
            Backend::Memory(slot) => {
                if let Ok(mut slot) = slot.write() {
                    *slot = token;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore {
            backend: Backend::File(dir.path().join("nested").join("session.json")),
            honor_env: false,
        }
    }

    #[test]
    fn missing_file_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(file_store(&dir).token().unwrap(), None);
    }

    #[test]
    fn saved_token_is_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        store.save_token("  abc.def.ghi \n").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("abc.def.ghi"));

        store.clear().unwrap();
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn in_memory_store_is_shared_between_clones() {
        let store = SessionStore::in_memory(None);
        let clone = store.clone();
        store.save_token("t1").unwrap();
        assert_eq!(clone.token().unwrap().as_deref(), Some("t1"));
        assert!(store.path().is_none());
    }
}
