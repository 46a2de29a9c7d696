//! The current language and the entry points every component localizes through.

use crate::error::L10nError;
use crate::handle::LocalizedString;
use crate::settings::{MemorySettings, SettingsStore};
use es_l10n_core::{
    Dictionary, DictionaryStore, L10nArgs, PluralRule, Resolver, load_dictionaries_from_dir,
    load_embedded_dictionaries, negotiate_language, parse_posix_locale,
};
use es_l10n_toml::{L10nConfig, L10nConfigError};
use parking_lot::{Mutex, RwLock};
use percent_encoding::percent_decode_str;
use rust_embed::RustEmbed;
use std::env;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Passed to subscribers after the current language changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageChange {
    pub previous: String,
    pub current: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&LanguageChange) + Send + Sync>;

/// How a [`Localizer`] picks its initial language and where it persists it.
///
/// ```
/// use es_l10n::{Localizer, LocalizerOptions};
///
/// let localizer = Localizer::with_options(
///     LocalizerOptions::builder()
///         .query("?lang=de")
///         .host_languages(vec![])
///         .build(),
/// );
/// assert_eq!(localizer.language(), "de");
/// ```
#[derive(bon::Builder)]
pub struct LocalizerOptions {
    #[builder(default)]
    config: L10nConfig,
    /// Where the selected language is persisted. In-memory when unset.
    settings: Option<Arc<dyn SettingsStore>>,
    /// Query string (or full URL) that may carry the language parameter.
    #[builder(into)]
    query: Option<String>,
    /// Preferred languages of the host, most preferred first. Read from the
    /// POSIX locale environment when unset.
    host_languages: Option<Vec<String>>,
    /// Dictionaries registered before the initial language is negotiated.
    #[builder(default)]
    dictionaries: Vec<(String, Dictionary)>,
}

pub struct Localizer {
    config: L10nConfig,
    resolver: Resolver,
    language: RwLock<String>,
    /// Held across swap, persist and listener snapshot so that the persisted
    /// value always ends up equal to the current language.
    changing: Mutex<()>,
    settings: Arc<dyn SettingsStore>,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl fmt::Debug for Localizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Localizer")
            .field("language", &*self.language.read())
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("settings", &self.settings)
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizer {
    /// A localizer with the default configuration, every statically submitted
    /// dictionary and the language negotiated from the host environment.
    pub fn new() -> Self {
        Self::with_options(LocalizerOptions::builder().build())
    }

    pub fn with_options(options: LocalizerOptions) -> Self {
        let LocalizerOptions {
            config,
            settings,
            query,
            host_languages,
            dictionaries,
        } = options;

        let store = DictionaryStore::with_discovered_dictionaries();
        for (language, dictionary) in dictionaries {
            store.register(&language, dictionary);
        }

        let resolver = Resolver::with_dictionaries(
            config.default_language.clone(),
            store,
            config.resolved_cache_capacity,
        );
        let settings = settings.unwrap_or_else(|| Arc::new(MemorySettings::new()));
        let host_languages = host_languages.unwrap_or_else(self::host_languages);

        let language = initial_language(
            &config,
            query.as_deref(),
            settings.as_ref(),
            &host_languages,
            &resolver.dictionaries().languages(),
        );
        tracing::debug!("Initial language: '{}'", language);

        Self {
            config,
            resolver,
            language: RwLock::new(language),
            changing: Mutex::new(()),
            settings,
            listeners: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Reads `l10n.toml` in `base_dir` (defaults when absent), loads the
    /// dictionaries of its assets directory and negotiates the language
    /// against them.
    pub fn load(base_dir: &Path) -> Result<Self, L10nError> {
        let config = match L10nConfig::from_manifest_dir(base_dir) {
            Ok(config) => config,
            Err(L10nConfigError::NotFound) => L10nConfig::default(),
            Err(e) => return Err(e.into()),
        };
        config.default_language_identifier()?;

        let assets_dir = config.assets_dir_from_base(base_dir);
        let dictionaries = if assets_dir.is_dir() {
            load_dictionaries_from_dir(&assets_dir)?
        } else {
            tracing::debug!("No assets directory at {}", assets_dir.display());
            Vec::new()
        };

        Ok(Self::with_options(
            LocalizerOptions::builder()
                .config(config)
                .dictionaries(dictionaries)
                .build(),
        ))
    }

    pub fn config(&self) -> &L10nConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Registration point for dictionaries (`add` / `register`).
    pub fn dictionaries(&self) -> &DictionaryStore {
        self.resolver.dictionaries()
    }

    pub fn register_plural_rule<I, S>(&self, rule: PluralRule, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolver.register_plural_rule(rule, languages);
    }

    /// Registers every dictionary under the configured assets directory of
    /// `base_dir`. Returns the number of languages loaded.
    pub fn load_assets(&self, base_dir: &Path) -> Result<usize, L10nError> {
        let assets_dir = self.config.assets_dir_from_base(base_dir);
        let languages = load_dictionaries_from_dir(&assets_dir)?;
        Ok(self.register_all(languages))
    }

    /// Registers every dictionary embedded in `T`.
    pub fn load_embedded<T: RustEmbed>(&self) -> Result<usize, L10nError> {
        let languages = load_embedded_dictionaries::<T>()?;
        Ok(self.register_all(languages))
    }

    fn register_all(&self, languages: Vec<(String, Dictionary)>) -> usize {
        let count = languages.len();
        for (language, dictionary) in languages {
            self.dictionaries().register(&language, dictionary);
        }
        count
    }

    pub fn language(&self) -> String {
        self.language.read().clone()
    }

    /// Switches the current language, persists it and notifies subscribers.
    ///
    /// Returns `false` without side effects when `language` is empty or
    /// already current.
    pub fn set_language(&self, language: &str) -> bool {
        let language = language.trim();
        if language.is_empty() {
            return false;
        }

        let (change, listeners) = {
            let _changing = self.changing.lock();
            let previous = {
                let mut current = self.language.write();
                if *current == language {
                    return false;
                }
                std::mem::replace(&mut *current, language.to_string())
            };

            if let Err(e) = self.settings.write(&self.config.settings_key, language) {
                tracing::warn!("Failed to persist language '{}': {}", language, e);
            }
            tracing::debug!("Language changed from '{}' to '{}'", previous, language);

            let listeners: Vec<Listener> = self
                .listeners
                .read()
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            let change = LanguageChange {
                previous,
                current: language.to_string(),
            };
            (change, listeners)
        };

        for listener in listeners {
            listener(&change);
        }

        true
    }

    /// Calls `callback` after every language change until unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&LanguageChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Localizes `key` in the current language.
    pub fn t(&self, key: &str, args: Option<&L10nArgs<'_>>) -> String {
        self.resolve(key, &self.language(), args).to_string()
    }

    pub fn resolve(&self, key: &str, language: &str, args: Option<&L10nArgs<'_>>) -> Arc<str> {
        self.resolver.resolve(key, language, args)
    }

    /// Like [`Localizer::t`], keeping the key and language with the result.
    pub fn localized(&self, key: &str, args: Option<&L10nArgs<'_>>) -> LocalizedString {
        LocalizedString::resolve_with(self, key, None, args)
    }
}

fn initial_language(
    config: &L10nConfig,
    query: Option<&str>,
    settings: &dyn SettingsStore,
    host_languages: &[String],
    available: &[String],
) -> String {
    if let Some(language) = query.and_then(|query| query_value(query, &config.query_parameter)) {
        return language;
    }

    if let Some(language) = settings
        .read(&config.settings_key)
        .filter(|language| !language.trim().is_empty())
    {
        return language;
    }

    let mut available = available.to_vec();
    available.push(config.default_language.clone());
    negotiate_language(host_languages, &available)
        .unwrap_or_else(|| config.default_language.clone())
}

/// Percent-decoded value of `name` in a query string such as
/// `?lang=de&theme=dark`. A full URL is accepted; its fragment is ignored.
fn query_value(query: &str, name: &str) -> Option<String> {
    let query = query.split_once('?').map_or(query, |(_, query)| query);
    let query = query.split_once('#').map_or(query, |(query, _)| query);

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| percent_decode_str(key).decode_utf8_lossy() == name)
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Preferred languages of the host from `LANGUAGE`, `LC_ALL`, `LC_MESSAGES`
/// and `LANG`, most preferred first.
pub fn host_languages() -> Vec<String> {
    let mut candidates: Vec<String> = env::var("LANGUAGE")
        .map(|list| list.split(':').map(str::to_string).collect())
        .unwrap_or_default();
    candidates.extend(
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .into_iter()
            .filter_map(|var| env::var(var).ok()),
    );

    let mut languages: Vec<String> = Vec::new();
    for language in candidates
        .iter()
        .filter_map(|candidate| parse_posix_locale(candidate))
        .map(|language| language.to_string())
    {
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    languages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsError;
    use es_l10n_core::l10n_args;
    use rstest::rstest;
    use std::sync::{Mutex, mpsc};
    use std::thread;
    use std::time::Duration;

    fn localizer_with(settings: Option<Arc<dyn SettingsStore>>, query: Option<&str>) -> Localizer {
        Localizer::with_options(
            LocalizerOptions::builder()
                .host_languages(Vec::new())
                .maybe_settings(settings)
                .maybe_query(query)
                .build(),
        )
    }

    #[rstest]
    #[case("?lang=de", Some("de"))]
    #[case("lang=fr&theme=dark", Some("fr"))]
    #[case("https://example.com/app?theme=dark&lang=pt-BR#top", Some("pt-BR"))]
    #[case("?lang=pt%2DBR", Some("pt-BR"))]
    #[case("?%6Cang=de", Some("de"))]
    #[case("?language=de", None)]
    #[case("?lang=", None)]
    #[case("", None)]
    fn reads_query_parameter(#[case] query: &str, #[case] expected: Option<&str>) {
        assert_eq!(query_value(query, "lang").as_deref(), expected);
    }

    #[test]
    fn query_wins_over_persisted_language() {
        let settings = Arc::new(MemorySettings::with_value("language", "fr"));
        let localizer = localizer_with(Some(settings), Some("?lang=de"));

        assert_eq!(localizer.language(), "de");
    }

    #[test]
    fn persisted_language_wins_over_host() {
        let settings = Arc::new(MemorySettings::with_value("language", "fr"));
        let localizer = Localizer::with_options(
            LocalizerOptions::builder()
                .settings(settings)
                .host_languages(vec!["de".to_string()])
                .build(),
        );

        assert_eq!(localizer.language(), "fr");
    }

    #[test]
    fn host_language_is_negotiated_against_dictionaries() {
        let localizer = Localizer::with_options(
            LocalizerOptions::builder()
                .host_languages(vec!["ja".to_string(), "de-AT".to_string()])
                .dictionaries(vec![(
                    "de".to_string(),
                    Dictionary::from_iter([("Save", "Speichern")]),
                )])
                .build(),
        );

        assert_eq!(localizer.language(), "de");
    }

    #[test]
    fn unavailable_host_language_falls_back_to_default() {
        let config = L10nConfig {
            default_language: "fr".to_string(),
            ..L10nConfig::default()
        };
        let localizer = Localizer::with_options(
            LocalizerOptions::builder()
                .config(config)
                .host_languages(vec!["ja".to_string()])
                .build(),
        );

        assert_eq!(localizer.language(), "fr");
    }

    #[test]
    fn set_language_persists_and_notifies() {
        let settings = Arc::new(MemorySettings::new());
        let localizer = localizer_with(Some(settings.clone()), None);
        let changes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&changes);
        localizer.subscribe(move |change| seen.lock().unwrap().push(change.clone()));

        assert!(localizer.set_language("de"));

        assert_eq!(localizer.language(), "de");
        assert_eq!(settings.read("language").as_deref(), Some("de"));
        assert_eq!(
            *changes.lock().unwrap(),
            vec![LanguageChange {
                previous: "en".to_string(),
                current: "de".to_string(),
            }]
        );
    }

    #[rstest]
    #[case("")]
    #[case("  ")]
    #[case("en")]
    fn set_language_ignores_empty_and_unchanged(#[case] language: &str) {
        let localizer = localizer_with(None, None);
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        localizer.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        assert!(!localizer.set_language(language));
        assert_eq!(localizer.language(), "en");
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn unsubscribed_listeners_are_not_called() {
        let localizer = localizer_with(None, None);
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let id = localizer.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        localizer.set_language("de");
        assert!(localizer.unsubscribe(id));
        assert!(!localizer.unsubscribe(id));
        localizer.set_language("fr");

        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn listeners_may_read_the_localizer() {
        let localizer = Arc::new(localizer_with(None, None));
        localizer
            .dictionaries()
            .register("de", [("Save", "Speichern")]);
        let seen = Arc::new(Mutex::new(String::new()));
        let weak = Arc::downgrade(&localizer);
        let rendered = Arc::clone(&seen);
        localizer.subscribe(move |_| {
            if let Some(localizer) = weak.upgrade() {
                *rendered.lock().unwrap() = localizer.t("Save", None);
            }
        });

        localizer.set_language("de");

        assert_eq!(*seen.lock().unwrap(), "Speichern");
    }

    #[derive(Debug)]
    struct ReadOnlySettings;

    impl SettingsStore for ReadOnlySettings {
        fn read(&self, _key: &str) -> Option<String> {
            None
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), SettingsError> {
            Err(SettingsError::Io(std::io::Error::other("read-only")))
        }
    }

    #[test]
    fn persistence_failure_still_switches_language() {
        let localizer = localizer_with(Some(Arc::new(ReadOnlySettings)), None);

        assert!(localizer.set_language("de"));
        assert_eq!(localizer.language(), "de");
    }

    /// Settings whose first write waits until released.
    #[derive(Debug)]
    struct SlowFirstWrite {
        inner: MemorySettings,
        entered: Mutex<Option<mpsc::Sender<()>>>,
        release: Mutex<Option<mpsc::Receiver<()>>>,
    }

    impl SettingsStore for SlowFirstWrite {
        fn read(&self, key: &str) -> Option<String> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<(), SettingsError> {
            if let Some(entered) = self.entered.lock().unwrap().take() {
                entered.send(()).unwrap();
            }
            let release = self.release.lock().unwrap().take();
            if let Some(release) = release {
                release.recv().unwrap();
            }
            self.inner.write(key, value)
        }
    }

    #[test]
    fn concurrent_changes_persist_the_final_language() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let settings = Arc::new(SlowFirstWrite {
            inner: MemorySettings::new(),
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
        });
        let localizer = localizer_with(Some(settings.clone()), None);
        let changes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&changes);
        localizer.subscribe(move |change| seen.lock().unwrap().push(change.current.clone()));

        thread::scope(|scope| {
            let first = scope.spawn(|| localizer.set_language("de"));
            entered_rx.recv().unwrap();
            let second = scope.spawn(|| localizer.set_language("fr"));
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).unwrap();

            assert!(first.join().unwrap());
            assert!(second.join().unwrap());
        });

        assert_eq!(localizer.language(), "fr");
        assert_eq!(settings.read("language").as_deref(), Some("fr"));
        let mut changes = changes.lock().unwrap().clone();
        changes.sort();
        assert_eq!(changes, vec!["de", "fr"]);
    }

    #[test]
    fn t_uses_current_language() {
        let localizer = localizer_with(None, None);
        localizer.dictionaries().add(
            "de",
            [("${count:pluralityNumber} files", ["Eine Datei", "${count} Dateien"])],
        );
        let args = l10n_args! { "count" => 3 };

        assert_eq!(localizer.t("${count:pluralityNumber} files", Some(&args)), "3 files");
        localizer.set_language("de");
        assert_eq!(localizer.t("${count:pluralityNumber} files", Some(&args)), "3 Dateien");
    }
}
