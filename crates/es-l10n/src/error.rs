use es_l10n_core::LocalizationError;
use es_l10n_toml::L10nConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum L10nError {
    #[error("The process-wide localizer is already initialized")]
    AlreadyInitialized,
    #[error(transparent)]
    Config(#[from] L10nConfigError),
    #[error(transparent)]
    Localization(#[from] LocalizationError),
}
