#![doc = include_str!("../README.md")]

mod error;
mod handle;
mod localizer;
pub mod settings;

pub use error::L10nError;
pub use handle::{LocalizableString, LocalizedString};
pub use localizer::{
    LanguageChange, Localizer, LocalizerOptions, SubscriptionId, host_languages,
};
pub use settings::{FileSettings, MemorySettings, SettingsError, SettingsStore};

pub use es_l10n_core::{
    Dictionary, DictionaryEntry, DictionaryStore, Formattable, L10nArgs, L10nValue,
    LocalizationError, PluralRule, StaticDictionary, StaticEntry, l10n_args, plural,
};
pub use es_l10n_toml::{L10nConfig, L10nConfigError};

#[doc(hidden)]
pub use es_l10n_core::__inventory;

use std::sync::{Arc, OnceLock};

static LOCALIZER: OnceLock<Arc<Localizer>> = OnceLock::new();

/// Installs the process-wide localizer.
///
/// Fails with [`L10nError::AlreadyInitialized`] when one is already in place,
/// including the default one created by an earlier call to [`localizer`].
pub fn set_localizer(localizer: Localizer) -> Result<(), L10nError> {
    set_shared_localizer(Arc::new(localizer))
}

/// Like [`set_localizer`], keeping a handle for the caller.
pub fn set_shared_localizer(localizer: Arc<Localizer>) -> Result<(), L10nError> {
    LOCALIZER
        .set(localizer)
        .map_err(|_| L10nError::AlreadyInitialized)
}

/// The process-wide localizer, created with [`Localizer::new`] on first use
/// unless one was installed.
pub fn localizer() -> &'static Arc<Localizer> {
    LOCALIZER.get_or_init(|| Arc::new(Localizer::new()))
}

/// Localizes `key` in the current language.
///
/// ```
/// use es_l10n::{l10n_args, t};
///
/// let args = l10n_args! { "name" => "John" };
/// assert_eq!(t("Hello, ${name:string}!", Some(&args)), "Hello, John!");
/// ```
pub fn t(key: &str, args: Option<&L10nArgs<'_>>) -> String {
    localizer().t(key, args)
}

/// Merges `entries` into the dictionary of `language`.
pub fn register<I, K, V>(language: &str, entries: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<DictionaryEntry>,
{
    localizer().dictionaries().register(language, entries);
}

pub fn current_language() -> String {
    localizer().language()
}

pub fn set_language(language: &str) -> bool {
    localizer().set_language(language)
}

pub fn subscribe<F>(callback: F) -> SubscriptionId
where
    F: Fn(&LanguageChange) + Send + Sync + 'static,
{
    localizer().subscribe(callback)
}

pub fn unsubscribe(id: SubscriptionId) -> bool {
    localizer().unsubscribe(id)
}

/// Submits a dictionary that every [`Localizer`] picks up on construction.
///
/// ```
/// es_l10n::submit_dictionary!("file-picker", "de", {
///     "Open" => "Öffnen",
///     "${count:pluralityNumber} files" => ["Eine Datei", "${count} Dateien"],
/// });
/// ```
#[macro_export]
macro_rules! submit_dictionary {
    ($name:expr, $language:expr, { $($key:expr => $entry:tt),* $(,)? }) => {
        $crate::__inventory::submit! {
            $crate::StaticDictionary::new(
                $name,
                $language,
                &[$(($key, $crate::__static_entry!($entry))),*],
            )
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __static_entry {
    ([$($form:expr),* $(,)?]) => {
        $crate::StaticEntry::Plural(&[$($form),*])
    };
    ($template:expr) => {
        $crate::StaticEntry::Single($template)
    };
}
