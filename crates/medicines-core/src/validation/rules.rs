//! Field rules and the shared patterns they use.

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::{Rule, ValidationError, ValidationResult};
use crate::models::{Decimal, DATE_FORMAT};

/// `(NNN) NNN-NNNN`
pub static PHONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\d{3}\) \d{3}-\d{4}$").expect("valid regex"));

/// `yyyy-MM-dd`, digits only.
pub static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Start validating a field that may be absent.
pub fn field<'a>(name: &'static str, value: Option<&'a str>) -> Field<'a> {
    Field { name, value }
}

/// A field whose presence has not been checked yet.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    name: &'static str,
    value: Option<&'a str>,
}

impl<'a> Field<'a> {
    /// Reject missing, empty and whitespace-only values.
    pub fn required(self) -> ValidationResult<Present<'a>> {
        match self.value {
            Some(value) if !value.trim().is_empty() => Ok(Present {
                name: self.name,
                value,
            }),
            _ => Err(ValidationError::new(self.name, Rule::Required)),
        }
    }
}

/// A field known to hold a non-blank value.
#[derive(Debug, Clone, Copy)]
pub struct Present<'a> {
    name: &'static str,
    value: &'a str,
}

impl<'a> Present<'a> {
    /// Character count must fall within `bounds` (inclusive).
    pub fn length(self, bounds: RangeInclusive<usize>) -> ValidationResult<Self> {
        let actual = self.value.chars().count();
        if bounds.contains(&actual) {
            Ok(self)
        } else {
            Err(ValidationError::new(
                self.name,
                Rule::Length {
                    min: *bounds.start(),
                    max: *bounds.end(),
                    actual,
                },
            ))
        }
    }

    /// The whole value must match `pattern`.
    pub fn matches(self, pattern: &'static Regex) -> ValidationResult<Self> {
        if pattern.is_match(self.value) {
            Ok(self)
        } else {
            Err(ValidationError::new(self.name, Rule::Pattern(pattern.as_str())))
        }
    }

    /// Convert to a typed value; `None` from `convert` is a format failure.
    pub fn parse<T>(self, convert: impl FnOnce(&str) -> Option<T>) -> ValidationResult<T> {
        convert(self.value).ok_or_else(|| ValidationError::new(self.name, Rule::Format))
    }

    pub fn as_str(&self) -> &'a str {
        self.value
    }

    pub fn into_string(self) -> String {
        self.value.to_string()
    }
}

/// Numeric value must fall within `bounds` (inclusive).
pub fn within<T>(name: &'static str, value: T, bounds: RangeInclusive<T>) -> ValidationResult<T>
where
    T: PartialOrd + Display,
{
    if bounds.contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::new(
            name,
            Rule::Range {
                min: bounds.start().to_string(),
                max: bounds.end().to_string(),
            },
        ))
    }
}

/// Parse an integer, ignoring surrounding whitespace.
pub fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Parse a plain decimal literal exactly, ignoring surrounding whitespace.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::parse(value.trim())
}

/// Parse `true` or `false` exactly.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parse a `yyyy-MM-dd` calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !ISO_DATE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_required() {
        assert!(field("Name", Some("abc")).required().is_ok());

        for value in [None, Some(""), Some("   ")] {
            let err = field("Name", value).required().unwrap_err();
            assert_eq!(err, ValidationError::new("Name", Rule::Required));
        }
    }

    #[test]
    fn test_length_bounds_inclusive() {
        let check = |v: &str| {
            field("Name", Some(v))
                .required()
                .and_then(|p| p.length(2..=5))
                .is_ok()
        };

        assert!(check("ab"));
        assert!(check("abcde"));
        assert!(!check("a"));
        assert!(!check("abcdef"));

        // Counted in characters, not bytes
        assert!(check("ääää"));
    }

    #[test]
    fn test_phone_number_pattern() {
        let check = |v: &str| {
            field("PhoneNumber", Some(v))
                .required()
                .and_then(|p| p.length(14..=14))
                .and_then(|p| p.matches(&PHONE_NUMBER))
                .is_ok()
        };

        assert!(check("(123) 456-7890"));
        assert!(!check("123-456-7890"));
        assert!(!check("(123)456-7890"));
        assert!(!check("(123) 456-78901"));
        assert!(!check("(12a) 456-7890"));
    }

    #[test]
    fn test_within() {
        assert_eq!(within("category", 0, 0..=4), Ok(0));
        assert_eq!(within("category", 4, 0..=4), Ok(4));
        assert!(within("category", 5, 0..=4).is_err());

        let price = |text: &str| {
            within(
                "Price",
                Decimal::parse(text).unwrap(),
                Decimal::from_cents(1)..=Decimal::from_cents(100_000),
            )
        };
        assert!(price("0").is_err());
        assert!(price("0.0099999").is_err());
        assert!(price("1000.01").is_err());
        assert!(price("1000.0000000000000001").is_err());
        assert!(price("0.01").is_ok());
        assert!(price("1000.000").is_ok());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("12.50"), Some(Decimal::from_cents(1250)));
        assert_eq!(parse_decimal(" 7 "), Some(Decimal::from_cents(700)));
        assert_eq!(parse_decimal(".5"), Some(Decimal::from_cents(50)));
        assert_eq!(parse_decimal("1.005").map(|d| d.to_string()), Some("1.005".into()));
        assert_eq!(parse_decimal("1e3"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("12,50"), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2023-02-28"),
            NaiveDate::from_ymd_opt(2023, 2, 28)
        );
        assert_eq!(parse_date("2023-02-30"), None);
        assert_eq!(parse_date("2023-2-28"), None);
        assert_eq!(parse_date("28.02.2023"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("True"), None);
        assert_eq!(parse_bool("yes"), None);
    }

    proptest! {
        #[test]
        fn prop_length_matches_char_count(value in "[a-zA-Z ]{1,60}") {
            let count = value.chars().count();
            let result = field("Name", Some(value.as_str())).required().and_then(|p| p.length(2..=50));
            if value.trim().is_empty() {
                prop_assert!(result.is_err());
            } else {
                prop_assert_eq!(result.is_ok(), (2..=50).contains(&count));
            }
        }

        #[test]
        fn prop_well_formed_phone_numbers_pass(a in 0u32..1000, b in 0u32..1000, c in 0u32..10000) {
            let phone = format!("({:03}) {:03}-{:04}", a, b, c);
            prop_assert!(PHONE_NUMBER.is_match(&phone));
            prop_assert_eq!(phone.chars().count(), 14);
        }
    }
}
