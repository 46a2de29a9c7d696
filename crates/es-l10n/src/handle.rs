//! Value handles for localizable keys and their renderings.

use crate::localizer::Localizer;
use es_l10n_core::L10nArgs;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A template key that is localized on demand.
///
/// Cheap to clone; components keep these around and render them whenever
/// the current language changes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalizableString {
    key: Arc<str>,
}

impl LocalizableString {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Renders in the current language of the process-wide localizer.
    pub fn localize(&self, args: Option<&L10nArgs<'_>>) -> LocalizedString {
        self.localize_with(crate::localizer(), None, args)
    }

    /// Renders in `language` with the process-wide localizer.
    pub fn localize_in(&self, language: &str, args: Option<&L10nArgs<'_>>) -> LocalizedString {
        self.localize_with(crate::localizer(), Some(language), args)
    }

    /// Renders with `localizer`, in its current language unless `language` is given.
    pub fn localize_with(
        &self,
        localizer: &Localizer,
        language: Option<&str>,
        args: Option<&L10nArgs<'_>>,
    ) -> LocalizedString {
        LocalizedString::resolve_with(localizer, &self.key, language, args)
    }
}

impl From<&str> for LocalizableString {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for LocalizableString {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for LocalizableString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// The rendering of a key in one language.
///
/// Dereferences to the rendered text; use [`LocalizedString::value`] or
/// `String::from` where an owned string is needed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalizedString {
    key: Arc<str>,
    language: String,
    value: Arc<str>,
}

impl LocalizedString {
    /// Renders `key` with the process-wide localizer, in `language` or the
    /// current language.
    pub fn get(key: &str, language: Option<&str>, args: Option<&L10nArgs<'_>>) -> Self {
        Self::resolve_with(crate::localizer(), key, language, args)
    }

    pub(crate) fn resolve_with(
        localizer: &Localizer,
        key: &str,
        language: Option<&str>,
        args: Option<&L10nArgs<'_>>,
    ) -> Self {
        let language = language.map_or_else(|| localizer.language(), str::to_string);
        let value = localizer.resolve(key, &language, args);

        Self {
            key: key.into(),
            language,
            value,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// The cached rendering itself.
    pub fn shared(&self) -> Arc<str> {
        Arc::clone(&self.value)
    }
}

impl fmt::Display for LocalizedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Deref for LocalizedString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.value
    }
}

impl AsRef<str> for LocalizedString {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl PartialEq<str> for LocalizedString {
    fn eq(&self, other: &str) -> bool {
        &*self.value == other
    }
}

impl PartialEq<&str> for LocalizedString {
    fn eq(&self, other: &&str) -> bool {
        &*self.value == *other
    }
}

impl From<LocalizedString> for String {
    fn from(localized: LocalizedString) -> Self {
        localized.value.to_string()
    }
}
