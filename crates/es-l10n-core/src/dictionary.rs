//! Per-language dictionaries.
//!
//! A dictionary maps a template key to either one template or an ordered list
//! of plural forms. Registrations for the same language merge key by key, the
//! last write winning; languages never share entries.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DictionaryEntry {
    /// A template without plural forms.
    Single(String),
    /// Plural forms, indexed by the language's plural rule.
    Plural(Vec<String>),
}

impl From<String> for DictionaryEntry {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for DictionaryEntry {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for DictionaryEntry {
    fn from(forms: Vec<String>) -> Self {
        Self::Plural(forms)
    }
}

impl From<&[&str]> for DictionaryEntry {
    fn from(forms: &[&str]) -> Self {
        Self::Plural(forms.iter().map(|form| form.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for DictionaryEntry {
    fn from(forms: [&str; N]) -> Self {
        Self::from(&forms[..])
    }
}

/// The key → entry mapping of one language.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: FxHashMap<String, DictionaryEntry>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&DictionaryEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts an entry, returning the one it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        entry: impl Into<DictionaryEntry>,
    ) -> Option<DictionaryEntry> {
        self.entries.insert(key.into(), entry.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DictionaryEntry)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K, V> Extend<(K, V)> for Dictionary
where
    K: Into<String>,
    V: Into<DictionaryEntry>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, entry) in iter {
            self.insert(key, entry);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Dictionary
where
    K: Into<String>,
    V: Into<DictionaryEntry>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dictionary = Self::new();
        dictionary.extend(iter);
        dictionary
    }
}

impl IntoIterator for Dictionary {
    type Item = (String, DictionaryEntry);
    type IntoIter = std::collections::hash_map::IntoIter<String, DictionaryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A dictionary entry declared in a `static`.
#[derive(Clone, Copy, Debug)]
pub enum StaticEntry {
    Single(&'static str),
    Plural(&'static [&'static str]),
}

impl From<StaticEntry> for DictionaryEntry {
    fn from(entry: StaticEntry) -> Self {
        match entry {
            StaticEntry::Single(template) => Self::from(template),
            StaticEntry::Plural(forms) => Self::from(forms),
        }
    }
}

/// A dictionary submitted through `inventory` from anywhere in the binary.
#[derive(Debug)]
pub struct StaticDictionary {
    /// Name of the component contributing the entries. Submissions are
    /// applied in `(name, language)` order.
    pub name: &'static str,
    pub language: &'static str,
    pub entries: &'static [(&'static str, StaticEntry)],
}

impl StaticDictionary {
    pub const fn new(
        name: &'static str,
        language: &'static str,
        entries: &'static [(&'static str, StaticEntry)],
    ) -> Self {
        Self {
            name,
            language,
            entries,
        }
    }
}

inventory::collect!(StaticDictionary);

/// Every submitted [`StaticDictionary`], in application order.
pub fn discovered_dictionaries() -> Vec<&'static StaticDictionary> {
    let mut dictionaries: Vec<_> = inventory::iter::<StaticDictionary>().collect();
    dictionaries.sort_by_key(|dictionary| (dictionary.name, dictionary.language));
    dictionaries
}

fn empty_dictionary() -> Arc<Dictionary> {
    static EMPTY: OnceLock<Arc<Dictionary>> = OnceLock::new();
    EMPTY.get_or_init(|| Arc::new(Dictionary::new())).clone()
}

/// Thread-safe store of every language's dictionary.
///
/// Readers get an immutable snapshot; a registration copies the affected
/// dictionary only while a snapshot of it is still held elsewhere.
#[derive(Debug, Default)]
pub struct DictionaryStore {
    dictionaries: RwLock<FxHashMap<String, Arc<Dictionary>>>,
    generation: AtomicU64,
}

impl DictionaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with every [`StaticDictionary`] linked into the binary.
    pub fn with_discovered_dictionaries() -> Self {
        let store = Self::new();
        for dictionary in discovered_dictionaries() {
            tracing::debug!(
                "Discovered static dictionary '{}' for '{}' ({} entries)",
                dictionary.name,
                dictionary.language,
                dictionary.entries.len()
            );
            store.register(dictionary.language, dictionary.entries.iter().copied());
        }
        store
    }

    /// Merges `entries` into the dictionary of `language`.
    pub fn register<I, K, V>(&self, language: &str, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DictionaryEntry>,
    {
        let mut dictionaries = self.dictionaries.write();
        let dictionary = dictionaries.entry(language.to_string()).or_default();
        Arc::make_mut(dictionary).extend(entries);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Alias of [`DictionaryStore::register`].
    pub fn add<I, K, V>(&self, language: &str, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DictionaryEntry>,
    {
        self.register(language, entries);
    }

    /// Snapshot of the dictionary of `language`, empty when none was registered.
    pub fn get(&self, language: &str) -> Arc<Dictionary> {
        self.dictionaries
            .read()
            .get(language)
            .cloned()
            .unwrap_or_else(empty_dictionary)
    }

    /// Languages with a registered dictionary, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.dictionaries.read().keys().cloned().collect();
        languages.sort();
        languages
    }

    /// Counter bumped by every registration.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
