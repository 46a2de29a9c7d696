#![doc = include_str!("../README.md")]

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use unic_langid::{LanguageIdentifier, LanguageIdentifierError};

/// Name of the configuration file looked up in a manifest directory.
pub const CONFIG_FILE_NAME: &str = "l10n.toml";

#[derive(Debug, Error)]
pub enum L10nConfigError {
    /// Configuration file not found.
    #[error("l10n.toml configuration file not found")]
    NotFound,
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Encountered a language identifier that uses an unsupported subtag combination.
    #[error("Language identifier '{name}' is not supported: {reason}")]
    UnsupportedLanguageIdentifier {
        /// The invalid identifier.
        name: String,
        /// Explanation of why it is not supported.
        reason: String,
    },
    /// Encountered an invalid default language identifier.
    #[error("Invalid default language identifier '{name}'")]
    InvalidDefaultLanguageIdentifier {
        /// The invalid identifier.
        name: String,
        /// The parsing error produced by `unic-langid`.
        #[source]
        source: LanguageIdentifierError,
    },
}

fn default_language() -> String {
    "en".to_string()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("l10n")
}

fn default_query_parameter() -> String {
    "lang".to_string()
}

fn default_settings_key() -> String {
    "language".to_string()
}

/// The configuration for `es-l10n`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct L10nConfig {
    /// The language whose missing translations are expected (e.g., "en").
    ///
    /// Template keys are written in this language, so a lookup miss for it
    /// renders the key silently.
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Path to the assets directory containing dictionary files.
    /// Expected structure: {assets_dir}/{language}/{domain}.json
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// Query string parameter that selects the initial language (`?lang=de`).
    #[serde(default = "default_query_parameter")]
    pub query_parameter: String,
    /// Settings key under which the chosen language is persisted.
    #[serde(default = "default_settings_key")]
    pub settings_key: String,
    /// Upper bound on memoized renderings. Unbounded when absent.
    ///
    /// # Examples
    ///
    /// ```toml
    /// resolved_cache_capacity = 4096
    /// ```
    #[serde(default)]
    pub resolved_cache_capacity: Option<NonZeroUsize>,
}

impl Default for L10nConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            assets_dir: default_assets_dir(),
            query_parameter: default_query_parameter(),
            settings_key: default_settings_key(),
            resolved_cache_capacity: None,
        }
    }
}

impl L10nConfig {
    /// Reads the configuration from a path.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, L10nConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(L10nConfigError::NotFound);
        }

        let content = fs::read_to_string(path)?;

        let config: L10nConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// Read configuration for a given manifest directory.
    pub fn from_manifest_dir(manifest_dir: &Path) -> Result<Self, L10nConfigError> {
        Self::read_from_path(manifest_dir.join(CONFIG_FILE_NAME))
    }

    /// Returns the path to the assets directory, relative to the directory
    /// holding `l10n.toml`.
    pub fn assets_dir_from_base(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.assets_dir)
    }

    /// Returns the configured default language as a `LanguageIdentifier`.
    pub fn default_language_identifier(&self) -> Result<LanguageIdentifier, L10nConfigError> {
        let lang = self
            .default_language
            .parse::<LanguageIdentifier>()
            .map_err(|source| L10nConfigError::InvalidDefaultLanguageIdentifier {
                name: self.default_language.clone(),
                source,
            })?;

        ensure_supported_language_identifier(&lang, &self.default_language)?;

        Ok(lang)
    }
}

fn ensure_supported_language_identifier(
    lang: &LanguageIdentifier,
    original: &str,
) -> Result<(), L10nConfigError> {
    if lang.variants().next().is_some() {
        return Err(L10nConfigError::UnsupportedLanguageIdentifier {
            name: original.to_string(),
            reason: "variants are not supported".to_string(),
        });
    }

    Ok(())
}
