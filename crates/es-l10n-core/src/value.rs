//! Parameter values substituted into templates.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A value that renders itself differently per language, such as a date.
///
/// When a parameter implements this, its [`Formattable::format`] output is
/// substituted instead of its plain string form.
pub trait Formattable: Send + Sync + fmt::Debug {
    fn format(&self, language: &str) -> String;
}

/// A template parameter.
#[derive(Clone, Debug)]
pub enum L10nValue {
    String(String),
    Number(f64),
    Formattable(Arc<dyn Formattable>),
}

/// Named template parameters.
pub type L10nArgs<'a> = HashMap<&'a str, L10nValue>;

impl L10nValue {
    pub fn formattable(value: impl Formattable + 'static) -> Self {
        Self::Formattable(Arc::new(value))
    }

    /// The count a `pluralityNumber` placeholder selects a form with.
    ///
    /// Numbers are used as is, numeric strings are parsed and everything
    /// else counts as zero.
    pub fn plural_operand(&self) -> f64 {
        let operand = match self {
            Self::Number(n) => *n,
            Self::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Self::Formattable(_) => 0.0,
        };
        if operand.is_nan() { 0.0 } else { operand }
    }

    /// Text substituted for the placeholder in `language`.
    pub fn render(&self, language: &str) -> Cow<'_, str> {
        match self {
            Self::String(s) => Cow::Borrowed(s),
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Formattable(value) => Cow::Owned(value.format(language)),
        }
    }

    /// Stable, type-tagged text used to compare parameter sets.
    ///
    /// Formattable values are compared through their rendering in
    /// `language`, which is all the resolver ever observes of them.
    pub(crate) fn cache_repr(&self, language: &str) -> String {
        match self {
            Self::String(s) => format!("s:{}", s),
            Self::Number(n) => format!("n:{}", n),
            Self::Formattable(value) => format!("f:{}", value.format(language)),
        }
    }
}

impl From<String> for L10nValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for L10nValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Cow<'_, str>> for L10nValue {
    fn from(value: Cow<'_, str>) -> Self {
        Self::String(value.into_owned())
    }
}

impl<T: Formattable + 'static> From<Arc<T>> for L10nValue {
    fn from(value: Arc<T>) -> Self {
        Self::Formattable(value)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for L10nValue {
                fn from(value: $ty) -> Self {
                    Self::Number(value as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Builds an [`L10nArgs`] map.
///
/// ```
/// use es_l10n_core::{L10nValue, l10n_args};
///
/// let args = l10n_args! { "count" => 2, "name" => "John" };
/// assert!(matches!(args["count"], L10nValue::Number(n) if n == 2.0));
/// ```
#[macro_export]
macro_rules! l10n_args {
    () => {
        $crate::L10nArgs::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut args = $crate::L10nArgs::new();
        $(
            args.insert($name, $crate::L10nValue::from($value));
        )+
        args
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug)]
    struct IsoDate;

    impl Formattable for IsoDate {
        fn format(&self, language: &str) -> String {
            match language {
                "de" => "31.12.2024".to_string(),
                _ => "12/31/2024".to_string(),
            }
        }
    }

    #[rstest]
    #[case::integer(L10nValue::from(3), 3.0)]
    #[case::float(L10nValue::from(2.5), 2.5)]
    #[case::negative(L10nValue::from(-4i64), -4.0)]
    #[case::numeric_string(L10nValue::from(" 7 "), 7.0)]
    #[case::text(L10nValue::from("many"), 0.0)]
    #[case::empty(L10nValue::from(""), 0.0)]
    #[case::nan(L10nValue::from(f64::NAN), 0.0)]
    #[case::formattable(L10nValue::formattable(IsoDate), 0.0)]
    fn plural_operand_coerces(#[case] value: L10nValue, #[case] expected: f64) {
        assert_eq!(value.plural_operand(), expected);
    }

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(L10nValue::from(2).render("en"), "2");
        assert_eq!(L10nValue::from(2.5).render("en"), "2.5");
        assert_eq!(L10nValue::from(1_000_000u32).render("en"), "1000000");
    }

    #[test]
    fn formattable_renders_per_language() {
        let value = L10nValue::from(Arc::new(IsoDate));

        assert_eq!(value.render("de"), "31.12.2024");
        assert_eq!(value.render("en"), "12/31/2024");
        assert_eq!(value.cache_repr("de"), "f:31.12.2024");
    }

    #[test]
    fn cache_repr_tags_types() {
        assert_ne!(
            L10nValue::from("1").cache_repr("en"),
            L10nValue::from(1).cache_repr("en")
        );
    }

    #[test]
    fn args_macro_builds_map() {
        let args = l10n_args! { "name" => "John", "count" => 1u8 };

        assert_eq!(args.len(), 2);
        assert_eq!(args["name"].render("en"), "John");
        assert_eq!(args["count"].plural_operand(), 1.0);
        assert!(l10n_args! {}.is_empty());
    }
}
