//! `${name}` / `${name:type}` placeholder parsing.
//!
//! Grammar: `${` key [ `:` type ] `}` where the key is non-empty and contains
//! neither `}` nor `:`, and the type is non-empty and contains no `}` (it may
//! carry `:`-separated subtypes). Anything else is literal text.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::ops::Range;
use std::sync::Arc;

/// Format type marking the parameter that selects a plural form.
pub const PLURALITY_NUMBER: &str = "pluralityNumber";

/// One placeholder occurrence in a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placeholder {
    /// The matched text, `${` and `}` included.
    pub literal: String,
    pub key: String,
    pub format_type: Option<String>,
    /// Byte range of `literal` within the template.
    pub range: Range<usize>,
}

impl Placeholder {
    pub fn is_plurality_number(&self) -> bool {
        self.format_type
            .as_deref()
            .and_then(|format_type| format_type.split(':').next())
            == Some(PLURALITY_NUMBER)
    }
}

/// Scans `template` for placeholders, left to right, without overlap.
pub fn parse_placeholders(template: &str) -> Vec<Placeholder> {
    let mut placeholders = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = template[cursor..].find("${") {
        let start = cursor + offset;
        let body_start = start + 2;
        let Some(body_len) = template[body_start..].find('}') else {
            break;
        };
        let end = body_start + body_len + 1;

        match split_body(&template[body_start..body_start + body_len]) {
            Some((key, format_type)) => {
                placeholders.push(Placeholder {
                    literal: template[start..end].to_string(),
                    key: key.to_string(),
                    format_type: format_type.map(str::to_string),
                    range: start..end,
                });
                cursor = end;
            },
            None => cursor = start + 1,
        }
    }

    placeholders
}

fn split_body(body: &str) -> Option<(&str, Option<&str>)> {
    let (key, format_type) = match body.split_once(':') {
        Some((key, format_type)) => (key, Some(format_type)),
        None => (body, None),
    };

    if key.is_empty() || format_type.is_some_and(str::is_empty) {
        return None;
    }

    Some((key, format_type))
}

/// Memoizing front of [`parse_placeholders`].
///
/// Templates are the literal strings written in source and dictionaries, so
/// the cache is never evicted.
#[derive(Debug, Default)]
pub struct TemplateParser {
    cache: RwLock<FxHashMap<Box<str>, Arc<[Placeholder]>>>,
}

impl TemplateParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, template: &str) -> Arc<[Placeholder]> {
        if let Some(parsed) = self.cache.read().get(template) {
            return parsed.clone();
        }

        let mut cache = self.cache.write();
        cache
            .entry(template.into())
            .or_insert_with(|| parse_placeholders(template).into())
            .clone()
    }

    pub fn cached_templates(&self) -> usize {
        self.cache.read().len()
    }
}
