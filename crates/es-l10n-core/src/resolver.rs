//! Key + language + parameters → final string.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Key missing in language | Key text is the template; warning unless default language |
//! | Plural index past the last form | Last form is used |
//! | Empty plural list | Key text is the template |
//! | No plural rule for language | Form 0 |
//! | Missing parameter | Placeholder left as written |
//!
//! Nothing here returns an error: a broken translation degrades to
//! displayable text.

use crate::dictionary::{DictionaryEntry, DictionaryStore};
use crate::plural::{PluralRule, PluralRuleTable};
use crate::template::TemplateParser;
use crate::value::{L10nArgs, L10nValue};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Language template keys are written in.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Identity of a rendering: parameters are sorted by name so that insertion
/// order never matters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    key: String,
    language: String,
    args: Vec<(String, String)>,
}

impl CacheKey {
    fn new(key: &str, language: &str, args: Option<&L10nArgs<'_>>) -> Self {
        let mut args: Vec<(String, String)> = args
            .into_iter()
            .flatten()
            .map(|(name, value)| (name.to_string(), value.cache_repr(language)))
            .collect();
        args.sort();

        Self {
            key: key.to_string(),
            language: language.to_string(),
            args,
        }
    }
}

enum Renderings {
    Unbounded(FxHashMap<CacheKey, Arc<str>>),
    Bounded(LruCache<CacheKey, Arc<str>>),
}

/// Dictionary generation and plural rule generation a rendering was
/// produced from.
type Generation = (u64, u64);

struct ResolvedCache {
    renderings: Renderings,
    generation: Generation,
}

impl ResolvedCache {
    fn new(capacity: Option<NonZeroUsize>) -> Self {
        let renderings = match capacity {
            Some(capacity) => Renderings::Bounded(LruCache::new(capacity)),
            None => Renderings::Unbounded(FxHashMap::default()),
        };

        Self {
            renderings,
            generation: (0, 0),
        }
    }

    /// Moves the cache forward to `generation`, dropping older renderings.
    /// Returns `false` when `generation` is older than the cache, in which
    /// case the caller must neither read nor store renderings.
    fn sync(&mut self, generation: Generation) -> bool {
        if self.generation == generation {
            return true;
        }
        if generation.0 < self.generation.0 || generation.1 < self.generation.1 {
            return false;
        }

        if self.len() > 0 {
            tracing::debug!(
                "Dictionaries or plural rules changed, dropping {} cached renderings",
                self.len()
            );
        }
        self.clear();
        self.generation = generation;
        true
    }

    fn get(&mut self, key: &CacheKey) -> Option<Arc<str>> {
        match &mut self.renderings {
            Renderings::Unbounded(map) => map.get(key).cloned(),
            Renderings::Bounded(lru) => lru.get(key).cloned(),
        }
    }

    /// Stores `value` unless an equal key is already cached, returning the
    /// cached value either way.
    fn insert(&mut self, key: CacheKey, value: Arc<str>) -> Arc<str> {
        if let Some(existing) = self.get(&key) {
            return existing;
        }

        match &mut self.renderings {
            Renderings::Unbounded(map) => {
                map.insert(key, value.clone());
            },
            Renderings::Bounded(lru) => {
                lru.put(key, value.clone());
            },
        }
        value
    }

    fn clear(&mut self) {
        match &mut self.renderings {
            Renderings::Unbounded(map) => map.clear(),
            Renderings::Bounded(lru) => lru.clear(),
        }
    }

    fn len(&self) -> usize {
        match &self.renderings {
            Renderings::Unbounded(map) => map.len(),
            Renderings::Bounded(lru) => lru.len(),
        }
    }
}

/// Resolves template keys into localized strings.
///
/// Renderings are memoized by `(key, language, parameters)`: equal inputs
/// return the same `Arc<str>` for as long as the entry stays cached.
pub struct Resolver {
    default_language: String,
    dictionaries: DictionaryStore,
    plural_rules: RwLock<PluralRuleTable>,
    /// Bumped after every plural rule registration.
    rules_generation: AtomicU64,
    templates: TemplateParser,
    resolved: Mutex<ResolvedCache>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("default_language", &self.default_language)
            .field("languages", &self.dictionaries.languages())
            .field("cached_templates", &self.templates.cached_templates())
            .field("cached_renderings", &self.cached_renderings())
            .finish()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl Resolver {
    /// A resolver with CLDR plural rules, no dictionaries and an unbounded cache.
    pub fn new(default_language: impl Into<String>) -> Self {
        Self::with_cache_capacity(default_language, None)
    }

    /// Like [`Resolver::new`], keeping at most `capacity` renderings when set.
    pub fn with_cache_capacity(
        default_language: impl Into<String>,
        capacity: Option<NonZeroUsize>,
    ) -> Self {
        Self::with_dictionaries(default_language, DictionaryStore::new(), capacity)
    }

    pub fn with_dictionaries(
        default_language: impl Into<String>,
        dictionaries: DictionaryStore,
        capacity: Option<NonZeroUsize>,
    ) -> Self {
        Self {
            default_language: default_language.into(),
            dictionaries,
            plural_rules: RwLock::new(PluralRuleTable::cldr()),
            rules_generation: AtomicU64::new(0),
            templates: TemplateParser::new(),
            resolved: Mutex::new(ResolvedCache::new(capacity)),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn dictionaries(&self) -> &DictionaryStore {
        &self.dictionaries
    }

    pub fn plural_rule(&self, language: &str) -> Option<PluralRule> {
        self.plural_rules.read().get(language)
    }

    /// Associates `rule` with `languages` and drops cached renderings.
    pub fn register_plural_rule<I, S>(&self, rule: PluralRule, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plural_rules.write().register(rule, languages);
        self.rules_generation.fetch_add(1, Ordering::AcqRel);
        self.resolved.lock().sync(self.generation());
    }

    fn generation(&self) -> Generation {
        (
            self.dictionaries.generation(),
            self.rules_generation.load(Ordering::Acquire),
        )
    }

    pub fn cached_renderings(&self) -> usize {
        self.resolved.lock().len()
    }

    pub fn resolve(&self, key: &str, language: &str, args: Option<&L10nArgs<'_>>) -> Arc<str> {
        let cache_key = CacheKey::new(key, language, args);
        let generation = self.generation();

        {
            let mut resolved = self.resolved.lock();
            if !resolved.sync(generation) {
                drop(resolved);
                return Arc::from(self.render(key, language, args));
            }
            if let Some(hit) = resolved.get(&cache_key) {
                return hit;
            }
        }

        let rendered: Arc<str> = Arc::from(self.render(key, language, args));

        let mut resolved = self.resolved.lock();
        if resolved.generation != generation {
            return rendered;
        }
        resolved.insert(cache_key, rendered)
    }

    fn render(&self, key: &str, language: &str, args: Option<&L10nArgs<'_>>) -> String {
        let dictionary = self.dictionaries.get(language);

        let template = match dictionary.get(key) {
            Some(DictionaryEntry::Single(template)) => template.as_str(),
            Some(DictionaryEntry::Plural(forms)) => self
                .select_form(key, language, forms, args)
                .unwrap_or(key),
            None => {
                if language != self.default_language {
                    tracing::warn!(
                        "[Localizer] No \"{}\" localization found for \"{}\".",
                        language,
                        key
                    );
                }
                key
            },
        };

        self.substitute(template, language, args)
    }

    fn select_form<'a>(
        &self,
        key: &str,
        language: &str,
        forms: &'a [String],
        args: Option<&L10nArgs<'_>>,
    ) -> Option<&'a str> {
        let Some(last) = forms.len().checked_sub(1) else {
            tracing::debug!("Plural entry for \"{}\" in \"{}\" has no forms", key, language);
            return None;
        };

        let count = self
            .templates
            .parse(key)
            .iter()
            .find(|placeholder| placeholder.is_plurality_number())
            .and_then(|placeholder| args?.get(placeholder.key.as_str()))
            .map_or(0.0, L10nValue::plural_operand);

        let index = self
            .plural_rule(language)
            .map_or(0, |rule| rule.select(count));

        if index > last {
            tracing::debug!(
                "Plural form {} of \"{}\" missing in \"{}\", using form {}",
                index,
                key,
                language,
                last
            );
        }

        Some(forms[index.min(last)].as_str())
    }

    fn substitute(&self, template: &str, language: &str, args: Option<&L10nArgs<'_>>) -> String {
        let placeholders = self.templates.parse(template);
        if placeholders.is_empty() {
            return template.to_string();
        }

        let mut output = String::with_capacity(template.len());
        let mut cursor = 0;
        for placeholder in placeholders.iter() {
            output.push_str(&template[cursor..placeholder.range.start]);
            match args.and_then(|args| args.get(placeholder.key.as_str())) {
                Some(value) => output.push_str(&value.render(language)),
                None => output.push_str(&placeholder.literal),
            }
            cursor = placeholder.range.end;
        }
        output.push_str(&template[cursor..]);

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::l10n_args;
    use crate::plural::{ARABIC, NO_PLURAL};
    use crate::value::Formattable;
    use rstest::rstest;
    use std::sync::{Mutex as StdMutex, mpsc};
    use tracing_test::traced_test;

    const ITEMS: &str = "${count:pluralityNumber} items";
    const HELLO: &str = "Hello, ${name:string}!";

    fn resolver() -> Resolver {
        let resolver = Resolver::default();
        resolver
            .dictionaries()
            .register("de", [(ITEMS, ["Ein Element", "${count} Elemente"])]);
        resolver
            .dictionaries()
            .register("de", [(HELLO, "Hallo, ${name}!"), ("Save", "Speichern")]);
        resolver
    }

    #[derive(Debug)]
    struct Day;

    impl Formattable for Day {
        fn format(&self, language: &str) -> String {
            match language {
                "de" => "31.12.2024".to_string(),
                _ => "Dec 31, 2024".to_string(),
            }
        }
    }

    #[rstest]
    #[case(0, "0 Elemente")]
    #[case(1, "Ein Element")]
    #[case(2, "2 Elemente")]
    #[case(21, "21 Elemente")]
    fn selects_plural_form(#[case] count: i32, #[case] expected: &str) {
        let resolver = resolver();
        let args = l10n_args! { "count" => count };

        assert_eq!(&*resolver.resolve(ITEMS, "de", Some(&args)), expected);
    }

    #[test]
    fn substitutes_parameters() {
        let resolver = resolver();
        let args = l10n_args! { "name" => "John" };

        assert_eq!(&*resolver.resolve(HELLO, "de", Some(&args)), "Hallo, John!");
    }

    #[test]
    fn template_without_placeholders_ignores_params() {
        let resolver = resolver();
        let args = l10n_args! { "name" => "John", "count" => 4 };

        assert_eq!(&*resolver.resolve("Save", "de", Some(&args)), "Speichern");
        assert_eq!(&*resolver.resolve("Save", "de", None), "Speichern");
    }

    #[test]
    #[traced_test]
    fn missing_translation_falls_back_to_key_and_warns_once() {
        let resolver = resolver();
        let args = l10n_args! { "count" => 3 };

        let first = resolver.resolve(ITEMS, "fa", Some(&args));
        let second = resolver.resolve(ITEMS, "fa", Some(&args));

        assert_eq!(&*first, "3 items");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(logs_contain(
            "[Localizer] No \"fa\" localization found for \"${count:pluralityNumber} items\"."
        ));
        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("[Localizer] No \"fa\""))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("expected one warning, got {}", n)),
            }
        });
    }

    #[test]
    #[traced_test]
    fn default_language_misses_are_silent() {
        let resolver = resolver();
        let args = l10n_args! { "name" => "Ada" };

        assert_eq!(&*resolver.resolve(HELLO, "en", Some(&args)), "Hello, Ada!");
        assert!(!logs_contain("[Localizer]"));
    }

    #[test]
    fn equal_params_in_any_order_share_one_rendering() {
        let resolver = resolver();
        let mut forward = L10nArgs::new();
        forward.insert("count", L10nValue::from(1));
        forward.insert("name", L10nValue::from("X"));
        let mut backward = L10nArgs::new();
        backward.insert("name", L10nValue::from("X"));
        backward.insert("count", L10nValue::from(1));

        let first = resolver.resolve(ITEMS, "de", Some(&forward));
        let second = resolver.resolve(ITEMS, "de", Some(&backward));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.cached_renderings(), 1);
    }

    #[test]
    fn different_params_are_cached_separately() {
        let resolver = resolver();

        let one = resolver.resolve(ITEMS, "de", Some(&l10n_args! { "count" => 1 }));
        let text_one = resolver.resolve(ITEMS, "de", Some(&l10n_args! { "count" => "1" }));

        assert_eq!(one, text_one);
        assert!(!Arc::ptr_eq(&one, &text_one));
        assert_eq!(resolver.cached_renderings(), 2);
    }

    #[test]
    fn formattable_values_are_formatted_per_language() {
        let resolver = Resolver::default();
        resolver
            .dictionaries()
            .register("de", [("Due ${date:date}", "Fällig am ${date}")]);
        let args = l10n_args! { "date" => Arc::new(Day) };

        assert_eq!(
            &*resolver.resolve("Due ${date:date}", "de", Some(&args)),
            "Fällig am 31.12.2024"
        );
        assert_eq!(
            &*resolver.resolve("Due ${date:date}", "en", Some(&args)),
            "Due Dec 31, 2024"
        );
    }

    #[test]
    fn missing_plurality_parameter_counts_as_zero() {
        let resolver = resolver();

        assert_eq!(&*resolver.resolve(ITEMS, "de", None), "${count} Elemente");
    }

    #[test]
    fn non_numeric_count_counts_as_zero() {
        let resolver = resolver();
        let args = l10n_args! { "count" => "several" };

        assert_eq!(&*resolver.resolve(ITEMS, "de", Some(&args)), "several Elemente");
    }

    #[test]
    fn out_of_range_form_is_clamped_to_last() {
        let resolver = Resolver::default();
        resolver.register_plural_rule(ARABIC, ["ar"]);
        resolver
            .dictionaries()
            .register("ar", [(ITEMS, ["عنصر واحد", "${count} عناصر"])]);

        let args = l10n_args! { "count" => 5 };

        assert_eq!(&*resolver.resolve(ITEMS, "ar", Some(&args)), "5 عناصر");
    }

    #[test]
    fn language_without_rule_uses_first_form() {
        let resolver = Resolver::default();
        resolver
            .dictionaries()
            .register("tlh", [(ITEMS, ["${count} Doch", "${count} Dochmey"])]);

        let args = l10n_args! { "count" => 7 };

        assert_eq!(&*resolver.resolve(ITEMS, "tlh", Some(&args)), "7 Doch");
    }

    #[test]
    fn empty_plural_list_renders_key() {
        let resolver = Resolver::default();
        resolver
            .dictionaries()
            .register("de", [(ITEMS, DictionaryEntry::Plural(Vec::new()))]);

        let args = l10n_args! { "count" => 2 };

        assert_eq!(&*resolver.resolve(ITEMS, "de", Some(&args)), "2 items");
    }

    #[test]
    fn missing_parameter_keeps_placeholder() {
        let resolver = resolver();

        assert_eq!(&*resolver.resolve(HELLO, "de", None), "Hallo, ${name}!");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let resolver = Resolver::default();
        resolver
            .dictionaries()
            .register("de", [("${a} and ${b}", "${a} und ${b}")]);
        let args = l10n_args! { "a" => "${b}", "b" => "B" };

        assert_eq!(
            &*resolver.resolve("${a} and ${b}", "de", Some(&args)),
            "${b} und B"
        );
    }

    #[test]
    fn registration_invalidates_cached_renderings() {
        let resolver = Resolver::default();
        let before = resolver.resolve("Save", "de", None);
        assert_eq!(&*before, "Save");

        resolver.dictionaries().register("de", [("Save", "Speichern")]);

        assert_eq!(&*resolver.resolve("Save", "de", None), "Speichern");
    }

    #[test]
    fn plural_rule_registration_invalidates_cached_renderings() {
        let resolver = resolver();
        let args = l10n_args! { "count" => 2 };
        assert_eq!(&*resolver.resolve(ITEMS, "de", Some(&args)), "2 Elemente");

        resolver.register_plural_rule(NO_PLURAL, ["de"]);

        assert_eq!(&*resolver.resolve(ITEMS, "de", Some(&args)), "Ein Element");
    }

    /// Blocks the second `format` call until released, which is the one made
    /// while substituting after the plural form was selected.
    #[derive(Debug)]
    struct GatedDay {
        calls: AtomicU64,
        entered: StdMutex<Option<mpsc::Sender<()>>>,
        release: StdMutex<Option<mpsc::Receiver<()>>>,
    }

    impl Formattable for GatedDay {
        fn format(&self, _language: &str) -> String {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 1 {
                if let Some(entered) = self.entered.lock().unwrap().take() {
                    entered.send(()).unwrap();
                }
                let release = self.release.lock().unwrap().take();
                if let Some(release) = release {
                    release.recv().unwrap();
                }
            }
            "today".to_string()
        }
    }

    #[test]
    fn rule_registered_during_rendering_is_not_shadowed_by_cache() {
        const DUE: &str = "${count:pluralityNumber} items ${when}";
        let resolver = Resolver::default();
        resolver.dictionaries().register(
            "de",
            [(DUE, ["Ein Element am ${when}", "${count} Elemente am ${when}"])],
        );
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let day = Arc::new(GatedDay {
            calls: AtomicU64::new(0),
            entered: StdMutex::new(Some(entered_tx)),
            release: StdMutex::new(Some(release_rx)),
        });
        let args = l10n_args! { "count" => 2, "when" => day };

        std::thread::scope(|scope| {
            let in_flight = scope.spawn(|| resolver.resolve(DUE, "de", Some(&args)));
            entered_rx.recv().unwrap();
            resolver.register_plural_rule(NO_PLURAL, ["de"]);
            release_tx.send(()).unwrap();

            assert_eq!(&*in_flight.join().unwrap(), "2 Elemente am today");
        });

        assert_eq!(
            &*resolver.resolve(DUE, "de", Some(&args)),
            "Ein Element am today"
        );
    }

    #[test]
    fn bounded_cache_evicts_least_recently_used() {
        let resolver = Resolver::with_cache_capacity(DEFAULT_LANGUAGE, NonZeroUsize::new(1));

        let save = resolver.resolve("Save", "en", None);
        resolver.resolve("Cancel", "en", None);
        let save_again = resolver.resolve("Save", "en", None);

        assert_eq!(resolver.cached_renderings(), 1);
        assert_eq!(save, save_again);
        assert!(!Arc::ptr_eq(&save, &save_again));
    }

    #[test]
    fn regional_language_uses_primary_rule() {
        let resolver = Resolver::default();
        resolver
            .dictionaries()
            .register("de-AT", [(ITEMS, ["Ein Element", "${count} Elemente"])]);

        let args = l10n_args! { "count" => 1 };

        assert_eq!(&*resolver.resolve(ITEMS, "de-AT", Some(&args)), "Ein Element");
    }
}
