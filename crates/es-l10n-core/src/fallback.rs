use fluent_fallback::env::LocalesProvider;
use unic_langid::LanguageIdentifier;

/// Returns the fallback locale list for the requested language.
///
/// This yields the requested locale first, then falls back to the primary
/// language subtag when region/script/variant subtags are present.
pub fn fallback_locales(requested: &LanguageIdentifier) -> impl LocalesProvider {
    let mut locales = vec![requested.clone()];

    let needs_primary_fallback = requested.script.is_some()
        || requested.region.is_some()
        || requested.variants().next().is_some();

    if needs_primary_fallback
        && let Ok(primary) = requested.language.as_str().parse::<LanguageIdentifier>()
        && !locales.iter().any(|lang| lang == &primary)
    {
        locales.push(primary);
    }

    locales
}

/// Picks the first available language from the fallback chain.
pub fn resolve_fallback_language(
    requested: &LanguageIdentifier,
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    fallback_locales(requested)
        .locales()
        .find(|candidate| available.iter().any(|lang| lang == candidate))
}

/// Parses a POSIX locale such as `de_DE.UTF-8@euro` into `de-DE`.
///
/// `C` and `POSIX` carry no language and yield `None`.
pub fn parse_posix_locale(value: &str) -> Option<LanguageIdentifier> {
    let tag = value
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();

    if tag.is_empty() || tag.eq_ignore_ascii_case("C") || tag.eq_ignore_ascii_case("POSIX") {
        return None;
    }

    tag.replace('_', "-").parse().ok()
}

/// Returns the first `requested` language whose fallback chain reaches one of
/// `available`, as the matching available identifier.
///
/// Entries of either list that are not valid language identifiers are skipped.
pub fn negotiate_language<R, A>(requested: &[R], available: &[A]) -> Option<String>
where
    R: AsRef<str>,
    A: AsRef<str>,
{
    let available: Vec<LanguageIdentifier> = available
        .iter()
        .filter_map(|lang| lang.as_ref().parse().ok())
        .collect();

    requested
        .iter()
        .filter_map(|lang| lang.as_ref().parse::<LanguageIdentifier>().ok())
        .find_map(|lang| resolve_fallback_language(&lang, &available))
        .map(|lang| lang.to_string())
}
