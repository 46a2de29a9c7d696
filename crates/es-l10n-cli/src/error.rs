//! Diagnostics reported by the `es-l10n` binary.

// Fields in these structs are read by miette's Diagnostic derive macro
#![allow(unused)]

use es_l10n::L10nError;
use es_l10n_core::LocalizationError;
use es_l10n_toml::L10nConfigError;
use miette::{Diagnostic, Severity};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[error("l10n.toml configuration file not found")]
#[diagnostic(
    code(es_l10n::config::not_found),
    help(
        "Create {expected_path} with the following content:\n\n  \
          default_language = \"en\"\n  \
          assets_dir = \"l10n\"\n"
    )
)]
pub struct ConfigNotFoundError {
    pub expected_path: String,
}

#[derive(Debug, Diagnostic, Error)]
#[error("assets directory not found: {path}")]
#[diagnostic(
    code(es_l10n::config::assets_not_found),
    help("Create the assets directory or update assets_dir in l10n.toml")
)]
pub struct AssetsNotFoundError {
    pub path: PathBuf,
}

#[derive(Debug, Diagnostic, Error)]
#[error("missing translation for '{key}' in '{language}'")]
#[diagnostic(code(es_l10n::check::missing_translation), severity(Warning))]
pub struct MissingTranslationWarning {
    pub key: String,
    pub language: String,
}

#[derive(Debug, Diagnostic, Error)]
#[error("'{key}' has {forms} plural form(s) in '{language}', its rule selects up to {expected}")]
#[diagnostic(
    code(es_l10n::check::missing_plural_forms),
    severity(Error),
    help("Counts selecting a missing form render the last form instead")
)]
pub struct MissingPluralFormsError {
    pub key: String,
    pub language: String,
    pub forms: usize,
    pub expected: usize,
}

#[derive(Debug, Diagnostic, Error)]
#[error("'{key}' has {forms} plural form(s) in '{language}', its rule selects only {expected}")]
#[diagnostic(code(es_l10n::check::extra_plural_forms), severity(Warning))]
pub struct ExtraPluralFormsWarning {
    pub key: String,
    pub language: String,
    pub forms: usize,
    pub expected: usize,
}

#[derive(Debug, Diagnostic, Error)]
#[error("'{key}' has plural forms in '{language}', which has no plural rule")]
#[diagnostic(
    code(es_l10n::check::no_plural_rule),
    severity(Warning),
    help("Only the first form is ever used; register a plural rule for '{language}'")
)]
pub struct NoPluralRuleWarning {
    pub key: String,
    pub language: String,
}

#[derive(Debug, Diagnostic, Error)]
#[error("'{key}' has plural forms in '{language}' but no pluralityNumber placeholder")]
#[diagnostic(
    code(es_l10n::check::plural_without_count),
    severity(Warning),
    help("Every count selects the first form; mark the count as ${{name:pluralityNumber}}")
)]
pub struct PluralWithoutCountWarning {
    pub key: String,
    pub language: String,
}

#[derive(Debug, Diagnostic, Error)]
#[error("translation of '{key}' in '{language}' uses unknown parameter '{parameter}'")]
#[diagnostic(
    code(es_l10n::check::unknown_parameter),
    severity(Error),
    help("Parameters must be named in the key; the placeholder is rendered literally")
)]
pub struct UnknownParameterError {
    pub key: String,
    pub language: String,
    pub parameter: String,
}

/// One finding of `es-l10n check`.
#[derive(Debug, Diagnostic, Error)]
pub enum CheckIssue {
    #[error(transparent)]
    #[diagnostic(transparent)]
    MissingTranslation(#[from] MissingTranslationWarning),

    #[error(transparent)]
    #[diagnostic(transparent)]
    MissingPluralForms(#[from] MissingPluralFormsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ExtraPluralForms(#[from] ExtraPluralFormsWarning),

    #[error(transparent)]
    #[diagnostic(transparent)]
    NoPluralRule(#[from] NoPluralRuleWarning),

    #[error(transparent)]
    #[diagnostic(transparent)]
    PluralWithoutCount(#[from] PluralWithoutCountWarning),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownParameter(#[from] UnknownParameterError),
}

impl CheckIssue {
    pub fn is_error(&self) -> bool {
        matches!(self.severity(), Some(Severity::Error) | None)
    }

    /// Deterministic ordering: language, then key, then diagnostic code.
    pub fn sort_key(&self) -> (String, String, String) {
        let (language, key) = match self {
            Self::MissingTranslation(e) => (&e.language, &e.key),
            Self::MissingPluralForms(e) => (&e.language, &e.key),
            Self::ExtraPluralForms(e) => (&e.language, &e.key),
            Self::NoPluralRule(e) => (&e.language, &e.key),
            Self::PluralWithoutCount(e) => (&e.language, &e.key),
            Self::UnknownParameter(e) => (&e.language, &e.key),
        };
        let code = self.code().map(|code| code.to_string()).unwrap_or_default();
        (language.clone(), key.clone(), code)
    }
}

#[derive(Debug, Diagnostic, Error)]
#[error("check found {error_count} error(s) and {warning_count} warning(s)")]
#[diagnostic(code(es_l10n::check::report))]
pub struct CheckReport {
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Diagnostic, Error)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    ConfigNotFound(#[from] ConfigNotFoundError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    AssetsNotFound(#[from] AssetsNotFoundError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Check(#[from] CheckReport),

    #[error(transparent)]
    #[diagnostic(code(es_l10n::config::invalid))]
    Config(#[from] L10nConfigError),

    #[error(transparent)]
    #[diagnostic(code(es_l10n::assets))]
    Localization(#[from] LocalizationError),

    #[error(transparent)]
    #[diagnostic(code(es_l10n::localizer))]
    L10n(#[from] L10nError),

    #[error("invalid argument '{0}', expected name=value")]
    #[diagnostic(code(es_l10n::resolve::invalid_argument))]
    InvalidArgument(String),
}
