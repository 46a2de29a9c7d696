//! Dictionary files.
//!
//! Layout: `{assets_dir}/{language}/{domain}.json`, each file a JSON object of
//! key → string or key → array of plural forms. Files of one language merge in
//! file name order.

use crate::dictionary::Dictionary;
use crate::error::LocalizationError;
use fs_err as fs;
use rust_embed::RustEmbed;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use unic_langid::LanguageIdentifier;

pub const DICTIONARY_EXTENSION: &str = "json";

/// Parses one dictionary file. `origin` names the file in errors.
pub fn parse_dictionary(content: &str, origin: &str) -> Result<Dictionary, LocalizationError> {
    serde_json::from_str(content).map_err(|source| LocalizationError::Parse {
        path: origin.to_string(),
        source,
    })
}

fn validate_language(name: &str) -> Result<(), LocalizationError> {
    name.parse::<LanguageIdentifier>()
        .map(|_| ())
        .map_err(|source| LocalizationError::InvalidLanguage {
            name: name.to_string(),
            source,
        })
}

/// Loads every language directory under `assets_dir`, sorted by language.
pub fn load_dictionaries_from_dir(
    assets_dir: &Path,
) -> Result<Vec<(String, Dictionary)>, LocalizationError> {
    let mut entries = fs::read_dir(assets_dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut languages = Vec::new();
    for entry in entries {
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let language = entry.file_name().to_string_lossy().into_owned();
        validate_language(&language)?;

        let dictionary = load_language_dir(&entry.path())?;
        tracing::info!(
            "Loaded {} entries for '{}' from {}",
            dictionary.len(),
            language,
            entry.path().display()
        );
        languages.push((language, dictionary));
    }

    Ok(languages)
}

fn load_language_dir(dir: &Path) -> Result<Dictionary, LocalizationError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file()
            && path.extension().is_some_and(|ext| ext == DICTIONARY_EXTENSION)
        {
            files.push(path);
        }
    }
    files.sort();

    let mut dictionary = Dictionary::new();
    for path in files {
        let content = fs::read_to_string(&path)?;
        dictionary.extend(parse_dictionary(&content, &path.display().to_string())?);
    }

    Ok(dictionary)
}

/// Loads dictionaries compiled into the binary with `rust-embed`, using the
/// same `{language}/{domain}.json` layout as [`load_dictionaries_from_dir`].
pub fn load_embedded_dictionaries<T: RustEmbed>()
-> Result<Vec<(String, Dictionary)>, LocalizationError> {
    let mut paths: Vec<String> = T::iter().map(|path| path.into_owned()).collect();
    paths.sort();

    let mut languages: BTreeMap<String, Dictionary> = BTreeMap::new();
    for path in paths {
        let Some((language, file_name)) = path.split_once('/') else {
            continue;
        };
        if file_name.contains('/')
            || !Path::new(file_name)
                .extension()
                .is_some_and(|ext| ext == DICTIONARY_EXTENSION)
        {
            continue;
        }
        validate_language(language)?;

        let Some(file) = T::get(&path) else {
            continue;
        };
        let content = std::str::from_utf8(&file.data)
            .map_err(|_| LocalizationError::InvalidUtf8(path.clone()))?;

        languages
            .entry(language.to_string())
            .or_default()
            .extend(parse_dictionary(content, &path)?);
    }

    Ok(languages.into_iter().collect())
}
