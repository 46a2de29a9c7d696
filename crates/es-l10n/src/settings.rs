//! Persistence of user preferences, such as the chosen language.

use fs_err as fs;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Key/value store the localizer persists the selected language in.
pub trait SettingsStore: Send + Sync + fmt::Debug {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// In-process settings, lost on exit.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let settings = Self::new();
        settings.values.write().insert(key.into(), value.into());
        settings
    }
}

impl SettingsStore for MemorySettings {
    fn read(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings kept in a TOML file of string pairs.
///
/// A missing file reads as empty and is created on the first write.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl SettingsStore for FileSettings {
    fn read(&self, key: &str) -> Option<String> {
        let _guard = self.lock.read();
        match self.load() {
            Ok(mut values) => values.remove(key),
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings file {}: {}", self.path.display(), e);
                None
            },
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let _guard = self.lock.write();
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&values)?)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_settings_round_trip() {
        let settings = MemorySettings::new();
        assert_eq!(settings.read("language"), None);

        settings.write("language", "de").unwrap();

        assert_eq!(settings.read("language").as_deref(), Some("de"));
    }

    #[test]
    fn file_settings_persist_across_instances() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/settings.toml");

        FileSettings::new(&path).write("language", "fr").unwrap();
        FileSettings::new(&path).write("theme", "dark").unwrap();

        let reopened = FileSettings::new(&path);
        assert_eq!(reopened.read("language").as_deref(), Some("fr"));
        assert_eq!(reopened.read("theme").as_deref(), Some("dark"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "language = \"fr\"\ntheme = \"dark\"\n"
        );
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        let settings = FileSettings::new(temp.path().join("absent.toml"));

        assert_eq!(settings.read("language"), None);
    }

    #[test]
    fn corrupt_file_fails_writes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        std::fs::write(&path, "language = [").unwrap();
        let settings = FileSettings::new(&path);

        assert_eq!(settings.read("language"), None);
        assert!(matches!(
            settings.write("language", "de"),
            Err(SettingsError::Parse(_))
        ));
    }
}
