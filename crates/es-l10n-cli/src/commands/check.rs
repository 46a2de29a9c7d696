//! Check command for validating dictionaries against their keys and plural rules.
//!
//! Per language it reports:
//! - keys translated in another language but not in this one (warning)
//! - plural entries with fewer forms than the language's rule selects (error)
//! - plural entries with more forms than the rule selects (warning)
//! - plural entries in a language without a rule (warning)
//! - plural entries whose key has no `pluralityNumber` placeholder (warning)
//! - placeholders naming a parameter the key does not declare (error)

use crate::commands::{PathArgs, load_config};
use crate::error::{
    AssetsNotFoundError, CheckIssue, CheckReport, CliError, ExtraPluralFormsWarning,
    MissingPluralFormsError, MissingTranslationWarning, NoPluralRuleWarning,
    PluralWithoutCountWarning, UnknownParameterError,
};
use crate::ui;
use clap::Parser;
use es_l10n_core::{
    Dictionary, DictionaryEntry, PluralRuleTable, TemplateParser, load_dictionaries_from_dir,
};
use std::collections::BTreeSet;

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    #[command(flatten)]
    pub path: PathArgs,
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let base_dir = args.path.base_dir();
    let config = load_config(&base_dir)?;
    config.default_language_identifier()?;

    let assets_dir = config.assets_dir_from_base(&base_dir);
    if !assets_dir.is_dir() {
        return Err(AssetsNotFoundError { path: assets_dir }.into());
    }

    let languages = load_dictionaries_from_dir(&assets_dir)?;

    let names: Vec<String> = languages.iter().map(|(name, _)| name.clone()).collect();
    tracing::debug!(
        "Checking {} language(s) against '{}'",
        names.len(),
        config.default_language
    );
    ui::print_check_header(&assets_dir, &names);

    let issues = check_dictionaries(
        &config.default_language,
        &languages,
        &PluralRuleTable::cldr(),
    );
    if issues.is_empty() {
        ui::print_check_success();
        return Ok(());
    }

    for issue in &issues {
        ui::print_issue(issue);
    }

    let error_count = issues.iter().filter(|issue| issue.is_error()).count();
    let warning_count = issues.len() - error_count;
    ui::print_check_summary(error_count, warning_count);

    if error_count > 0 {
        Err(CheckReport {
            error_count,
            warning_count,
        }
        .into())
    } else {
        Ok(())
    }
}

/// Checks every dictionary, returning the issues in deterministic order.
pub fn check_dictionaries(
    default_language: &str,
    languages: &[(String, Dictionary)],
    rules: &PluralRuleTable,
) -> Vec<CheckIssue> {
    let parser = TemplateParser::new();
    let mut issues: Vec<CheckIssue> = Vec::new();

    for (language, dictionary) in languages {
        if language != default_language {
            issues.extend(missing_translations(
                default_language,
                language,
                dictionary,
                languages,
            ));
        }

        for (key, entry) in dictionary.iter() {
            let key_placeholders = parser.parse(key);
            let known: BTreeSet<&str> = key_placeholders
                .iter()
                .map(|placeholder| placeholder.key.as_str())
                .collect();

            let templates: Vec<&str> = match entry {
                DictionaryEntry::Single(template) => vec![template.as_str()],
                DictionaryEntry::Plural(forms) => {
                    if !key_placeholders
                        .iter()
                        .any(|placeholder| placeholder.is_plurality_number())
                    {
                        issues.push(
                            PluralWithoutCountWarning {
                                key: key.to_string(),
                                language: language.clone(),
                            }
                            .into(),
                        );
                    }
                    issues.extend(plural_form_issues(language, key, forms.len(), rules));
                    forms.iter().map(String::as_str).collect()
                },
            };

            let unknown: BTreeSet<String> = templates
                .iter()
                .flat_map(|template| parser.parse(template).to_vec())
                .map(|placeholder| placeholder.key)
                .filter(|parameter| !known.contains(parameter.as_str()))
                .collect();
            issues.extend(unknown.into_iter().map(|parameter| {
                CheckIssue::from(UnknownParameterError {
                    key: key.to_string(),
                    language: language.clone(),
                    parameter,
                })
            }));
        }
    }

    issues.sort_by_key(CheckIssue::sort_key);
    issues
}

/// Keys translated in another non-default language but absent from `dictionary`.
fn missing_translations(
    default_language: &str,
    language: &str,
    dictionary: &Dictionary,
    languages: &[(String, Dictionary)],
) -> Vec<CheckIssue> {
    let missing: BTreeSet<&str> = languages
        .iter()
        .filter(|(other, _)| other != language && other != default_language)
        .flat_map(|(_, other)| other.keys())
        .filter(|key| !dictionary.contains_key(key))
        .collect();

    missing
        .into_iter()
        .map(|key| {
            MissingTranslationWarning {
                key: key.to_string(),
                language: language.to_string(),
            }
            .into()
        })
        .collect()
}

fn plural_form_issues(
    language: &str,
    key: &str,
    forms: usize,
    rules: &PluralRuleTable,
) -> Option<CheckIssue> {
    let Some(rule) = rules.get(language) else {
        return Some(
            NoPluralRuleWarning {
                key: key.to_string(),
                language: language.to_string(),
            }
            .into(),
        );
    };

    let expected = rule.forms();
    if forms < expected {
        Some(
            MissingPluralFormsError {
                key: key.to_string(),
                language: language.to_string(),
                forms,
                expected,
            }
            .into(),
        )
    } else if forms > expected {
        Some(
            ExtraPluralFormsWarning {
                key: key.to_string(),
                language: language.to_string(),
                forms,
                expected,
            }
            .into(),
        )
    } else {
        None
    }
}
