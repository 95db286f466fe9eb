// src/theme.rs
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{ClientError, Result};

const THEME_FILE: &str = "theme";

/// Persisted colour scheme preference. `System` is represented by the
/// absence of the stored value, matching how the browser client removes the
/// storage key when the user picks the system setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    /// Resolves `System` to a concrete scheme.
    pub fn resolve(self, system_default: ThemePreference) -> ThemePreference {
        match self {
            ThemePreference::System => system_default,
            other => other,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemePreference::Light => f.write_str("light"),
            ThemePreference::Dark => f.write_str("dark"),
            ThemePreference::System => f.write_str("system"),
        }
    }
}

impl FromStr for ThemePreference {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(ClientError::InvalidInput(format!(
                "unknown theme '{}' (expected light, dark or system)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(THEME_FILE),
        }
    }

    /// Reads the stored preference; anything unreadable or unrecognized is
    /// treated as the system default.
    pub fn load(&self) -> ThemePreference {
        match fs::read_to_string(&self.path) {
            Ok(contents) => contents.trim().parse().unwrap_or(ThemePreference::System),
            Err(_) => ThemePreference::System,
        }
    }

    pub fn store(&self, pref: ThemePreference) -> Result<()> {
        match pref {
            ThemePreference::System => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            other => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&self.path, other.to_string())?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::new(dir.path());

        assert_eq!(store.load(), ThemePreference::System);
        store.store(ThemePreference::Dark).unwrap();
        assert_eq!(store.load(), ThemePreference::Dark);
        store.store(ThemePreference::Light).unwrap();
        assert_eq!(store.load(), ThemePreference::Light);
    }

    #[test]
    fn test_system_removes_stored_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::new(dir.path());
        store.store(ThemePreference::Dark).unwrap();
        store.store(ThemePreference::System).unwrap();
        assert!(!dir.path().join(THEME_FILE).exists());
        assert_eq!(store.load(), ThemePreference::System);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(
            ThemePreference::System.resolve(ThemePreference::Dark),
            ThemePreference::Dark
        );
        assert_eq!(
            ThemePreference::Light.resolve(ThemePreference::Dark),
            ThemePreference::Light
        );
    }
}
