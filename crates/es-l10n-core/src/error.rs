use thiserror::Error;

/// Errors raised while loading dictionaries.
///
/// Resolution itself never fails; these only surface from asset loading.
#[derive(Debug, Error)]
pub enum LocalizationError {
    #[error("Failed to read dictionary assets: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse dictionary '{path}': {source}")]
    Parse {
        /// File or embedded asset path.
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid UTF-8 in embedded dictionary '{0}'")]
    InvalidUtf8(String),
    #[error("Invalid language identifier '{name}' in dictionary assets")]
    InvalidLanguage {
        name: String,
        #[source]
        source: unic_langid::LanguageIdentifierError,
    },
}
