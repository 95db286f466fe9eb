// src/credentials.rs
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::Result;

const CREDENTIAL_FILE: &str = "api_key";

/// File-backed store for the user's API key, the desktop analog of the
/// browser's localStorage slot. Write-through, unencrypted; the key is only
/// as safe as the file it lives in.
///
/// Handles are cheap to clone and are injected wherever credential access is
/// needed rather than living in a global.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CREDENTIAL_FILE),
        }
    }

    /// Returns the stored key, or `None` when absent or unreadable.
    pub fn get(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let key = contents.trim();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    pub fn set(&self, key: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, key.trim())?;
        debug!("stored API key at {}", self.path.display());
        Ok(())
    }

    /// Removes the stored key. Idempotent.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());

        assert_eq!(store.get(), None);
        store.set("  my-secret-key \n").unwrap();
        assert_eq!(store.get(), Some("my-secret-key".to_string()));

        store.clear().unwrap();
        assert_eq!(store.get(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_set_creates_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(&dir.path().join("nested").join("deeper"));
        store.set("k").unwrap();
        assert_eq!(store.get(), Some("k".to_string()));
    }

    #[test]
    fn test_blank_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.set("   ").unwrap();
        assert_eq!(store.get(), None);
    }
}
