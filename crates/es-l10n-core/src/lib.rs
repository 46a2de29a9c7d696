#![doc = include_str!("../README.md")]

pub mod assets;
pub mod dictionary;
pub mod error;
pub mod fallback;
pub mod plural;
pub mod resolver;
pub mod template;
pub mod value;

pub use assets::{load_dictionaries_from_dir, load_embedded_dictionaries, parse_dictionary};
pub use dictionary::{
    Dictionary, DictionaryEntry, DictionaryStore, StaticDictionary, StaticEntry,
    discovered_dictionaries,
};
pub use error::LocalizationError;
pub use fallback::{
    fallback_locales, negotiate_language, parse_posix_locale, resolve_fallback_language,
};
pub use plural::{PluralRule, PluralRuleTable, PluralSelector};
pub use resolver::{DEFAULT_LANGUAGE, Resolver};
pub use template::{PLURALITY_NUMBER, Placeholder, TemplateParser, parse_placeholders};
pub use value::{Formattable, L10nArgs, L10nValue};

#[doc(hidden)]
pub use inventory as __inventory;
