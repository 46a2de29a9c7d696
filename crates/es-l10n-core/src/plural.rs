//! CLDR cardinal plural rules.
//!
//! A [`PluralRule`] maps a count to the index of a plural form. Index 0 is
//! always the "one" (primary) form; the remaining indices follow CLDR
//! category order (zero, two, few, many, other) over the categories the
//! family actually uses. A dictionary entry lists its forms in that order.
//!
//! Rules are pure and total: any `f64` (negative, fractional, NaN, infinite)
//! maps to an index below [`PluralRule::forms`].

use rustc_hash::FxHashMap;
use std::fmt;

/// Selector function of a rule family. Receives a non-negative, non-NaN count.
pub type PluralSelector = fn(f64) -> usize;

/// A named cardinal plural rule family.
#[derive(Clone, Copy)]
pub struct PluralRule {
    name: &'static str,
    forms: usize,
    selector: PluralSelector,
}

impl PluralRule {
    pub const fn new(name: &'static str, forms: usize, selector: PluralSelector) -> Self {
        Self {
            name,
            forms,
            selector,
        }
    }

    /// Returns the form index for `count`.
    pub fn select(&self, count: f64) -> usize {
        let operand = if count.is_nan() { 0.0 } else { count.abs() };
        (self.selector)(operand)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of distinct forms a dictionary entry should provide.
    pub fn forms(&self) -> usize {
        self.forms
    }
}

impl fmt::Debug for PluralRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluralRule")
            .field("name", &self.name)
            .field("forms", &self.forms)
            .finish()
    }
}

impl PartialEq for PluralRule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.forms == other.forms
    }
}

impl Eq for PluralRule {}

fn integer(n: f64) -> Option<u64> {
    (n.fract() == 0.0).then_some(n as u64)
}

/// Chinese, Japanese, Korean and friends: a single form.
pub const NO_PLURAL: PluralRule = PluralRule::new("no-plural", 1, |_| 0);

/// English, German and most Germanic/Romance languages: one, other.
pub const ONE_OTHER: PluralRule = PluralRule::new("one-other", 2, |n| usize::from(n != 1.0));

/// French-style: 0 and 1 are singular.
pub const ONE_UPTO_ONE: PluralRule =
    PluralRule::new("one-upto-one", 2, |n| usize::from(n.trunc() > 1.0));

/// Russian, Ukrainian, Belarusian, Serbo-Croatian: one, few, many.
pub const EAST_SLAVIC: PluralRule = PluralRule::new("east-slavic", 3, |n| match integer(n) {
    Some(i) if i % 10 == 1 && i % 100 != 11 => 0,
    Some(i) if (2..=4).contains(&(i % 10)) && !(12..=14).contains(&(i % 100)) => 1,
    _ => 2,
});

/// Czech and Slovak: one, few, other.
pub const CZECH_SLOVAK: PluralRule = PluralRule::new("czech-slovak", 3, |n| match integer(n) {
    Some(1) => 0,
    Some(2..=4) => 1,
    _ => 2,
});

/// Polish: one, few, many.
pub const POLISH: PluralRule = PluralRule::new("polish", 3, |n| match integer(n) {
    Some(1) => 0,
    Some(i) if (2..=4).contains(&(i % 10)) && !(12..=14).contains(&(i % 100)) => 1,
    _ => 2,
});

/// Lithuanian: one, few, other.
pub const LITHUANIAN: PluralRule = PluralRule::new("lithuanian", 3, |n| match integer(n) {
    Some(i) if i % 10 == 1 && !(11..=19).contains(&(i % 100)) => 0,
    Some(i) if (2..=9).contains(&(i % 10)) && !(11..=19).contains(&(i % 100)) => 1,
    _ => 2,
});

/// Latvian: one, zero, other.
pub const LATVIAN: PluralRule = PluralRule::new("latvian", 3, |n| match integer(n) {
    Some(i) if i % 10 == 1 && i % 100 != 11 => 0,
    Some(i) if i % 10 == 0 || (11..=19).contains(&(i % 100)) => 1,
    _ => 2,
});

/// Romanian: one, few, other.
pub const ROMANIAN: PluralRule = PluralRule::new("romanian", 3, |n| match integer(n) {
    Some(1) => 0,
    Some(i) if i == 0 || (2..=19).contains(&(i % 100)) => 1,
    Some(_) => 2,
    None => 1,
});

/// Slovenian: one, two, few, other.
pub const SLOVENIAN: PluralRule = PluralRule::new("slovenian", 4, |n| match integer(n) {
    Some(i) if i % 100 == 1 => 0,
    Some(i) if i % 100 == 2 => 1,
    Some(i) if (3..=4).contains(&(i % 100)) => 2,
    Some(_) => 3,
    None => 2,
});

/// Irish: one, two, few, many, other.
pub const IRISH: PluralRule = PluralRule::new("irish", 5, |n| match integer(n) {
    Some(1) => 0,
    Some(2) => 1,
    Some(3..=6) => 2,
    Some(7..=10) => 3,
    _ => 4,
});

/// Arabic: one, zero, two, few, many, other.
pub const ARABIC: PluralRule = PluralRule::new("arabic", 6, |n| match integer(n) {
    Some(1) => 0,
    Some(0) => 1,
    Some(2) => 2,
    Some(i) if (3..=10).contains(&(i % 100)) => 3,
    Some(i) if (11..=99).contains(&(i % 100)) => 4,
    _ => 5,
});

const CLDR_FAMILIES: &[(PluralRule, &[&str])] = &[
    (
        NO_PLURAL,
        &[
            "ja", "zh", "ko", "vi", "th", "id", "ms", "lo", "my", "km", "jv", "ii", "yo", "bo",
        ],
    ),
    (
        ONE_OTHER,
        &[
            "en", "de", "nl", "sv", "da", "nb", "nn", "no", "it", "es", "el", "hu", "fi", "et",
            "tr", "bg", "ca", "gl", "eu", "he", "af", "sq", "az", "ka", "kk", "ky", "mn", "ne",
            "sw", "ta", "te", "ur", "uz", "ml", "mr", "fy", "lb", "fo", "is",
        ],
    ),
    (
        ONE_UPTO_ONE,
        &["fr", "pt", "hi", "bn", "fa", "am", "hy", "kab", "gu", "kn", "zu", "ff"],
    ),
    (EAST_SLAVIC, &["ru", "uk", "be", "hr", "sr", "bs", "sh"]),
    (CZECH_SLOVAK, &["cs", "sk"]),
    (POLISH, &["pl"]),
    (LITHUANIAN, &["lt"]),
    (LATVIAN, &["lv"]),
    (ROMANIAN, &["ro", "mo"]),
    (SLOVENIAN, &["sl"]),
    (IRISH, &["ga"]),
    (ARABIC, &["ar"]),
];

/// Language → rule mapping.
///
/// Many languages share one rule; lookups fall back from a regional
/// identifier (`de-AT`) to its primary language subtag (`de`).
#[derive(Clone, Debug, Default)]
pub struct PluralRuleTable {
    rules: FxHashMap<String, PluralRule>,
}

impl PluralRuleTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table populated with the built-in CLDR families.
    pub fn cldr() -> Self {
        let mut table = Self::new();
        for (rule, languages) in CLDR_FAMILIES {
            table.register(*rule, languages.iter().copied());
        }
        table
    }

    /// Associates `rule` with every language in `languages`, replacing any
    /// previous association.
    pub fn register<I, S>(&mut self, rule: PluralRule, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for language in languages {
            self.rules.insert(language.into(), rule);
        }
    }

    pub fn get(&self, language: &str) -> Option<PluralRule> {
        self.rules
            .get(language)
            .or_else(|| primary_subtag(language).and_then(|primary| self.rules.get(primary)))
            .copied()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn primary_subtag(language: &str) -> Option<&str> {
    let primary = language.split(['-', '_']).next()?;
    (!primary.is_empty() && primary.len() < language.len()).then_some(primary)
}
