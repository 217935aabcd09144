//! Medicine models.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Pharmacy;

/// Calendar format used for medicine dates on the wire and in storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Therapeutic category of a medicine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Analgesic,
    Antibiotic,
    Antiseptic,
    Sedative,
    Vaccine,
}

impl Category {
    /// All categories in code order.
    pub const ALL: [Category; 5] = [
        Category::Analgesic,
        Category::Antibiotic,
        Category::Antiseptic,
        Category::Sedative,
        Category::Vaccine,
    ];

    /// Look up a category by its numeric code (0-4).
    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Numeric code used on the wire and in storage.
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Display label (e.g. "Analgesic").
    pub fn label(self) -> &'static str {
        match self {
            Category::Analgesic => "Analgesic",
            Category::Antibiotic => "Antibiotic",
            Category::Antiseptic => "Antiseptic",
            Category::Sedative => "Sedative",
            Category::Vaccine => "Vaccine",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}


/// An exact decimal literal such as `1.005`, kept digit for digit.
///
/// Stored sign-magnitude with no leading zeros in `whole` and no trailing
/// zeros in `fraction`, so equal values compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    negative: bool,
    whole: String,
    fraction: String,
}

impl Decimal {
    /// Parse `[+-]digits[.digits]`. At least one digit; no exponent.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return None;
        }

        Some(Self::normalized(negative, whole, fraction))
    }

    /// The exact value of a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        let magnitude = cents.unsigned_abs();
        Self::normalized(
            cents < 0,
            &(magnitude / 100).to_string(),
            &format!("{:02}", magnitude % 100),
        )
    }

    fn normalized(negative: bool, whole: &str, fraction: &str) -> Self {
        let whole = whole.trim_start_matches('0').to_string();
        let fraction = fraction.trim_end_matches('0').to_string();
        let is_zero = whole.is_empty() && fraction.is_empty();
        Self {
            negative: negative && !is_zero,
            whole,
            fraction,
        }
    }

    /// Round to cents, half away from zero. `None` if it does not fit an `i64`.
    pub fn round_to_cents(&self) -> Option<i64> {
        let whole: i64 = if self.whole.is_empty() {
            0
        } else {
            self.whole.parse().ok()?
        };
        let digit = |index: usize| {
            self.fraction
                .as_bytes()
                .get(index)
                .map_or(0, |b| i64::from(b - b'0'))
        };

        let mut cents = whole.checked_mul(100)?.checked_add(digit(0) * 10 + digit(1))?;
        if digit(2) >= 5 {
            cents = cents.checked_add(1)?;
        }
        Some(if self.negative { -cents } else { cents })
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.whole
            .len()
            .cmp(&other.whole.len())
            .then_with(|| self.whole.cmp(&other.whole))
            .then_with(|| self.fraction.cmp(&other.fraction))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(if self.whole.is_empty() { "0" } else { &self.whole })?;
        if !self.fraction.is_empty() {
            write!(f, ".{}", self.fraction)?;
        }
        Ok(())
    }
}

/// Monetary amount stored with two decimal places.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Price(i64);

impl Price {
    /// Create a price from a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Round an exact decimal amount to cents, half away from zero.
    pub fn from_decimal(amount: &Decimal) -> Option<Self> {
        amount.round_to_cents().map(Self)
    }

    /// Amount in cents.
    pub fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    /// Always renders exactly two decimal places.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

/// A medicine as stored, owned by exactly one pharmacy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medicine {
    /// Store-assigned identity
    pub id: i64,
    /// Medicine name
    pub name: String,
    /// Unit price
    pub price: Price,
    /// Therapeutic category
    pub category: Category,
    /// Production date
    pub production_date: NaiveDate,
    /// Expiry date (always after production date)
    pub expiry_date: NaiveDate,
    /// Manufacturer
    pub producer: String,
    /// Owning pharmacy
    pub pharmacy_id: i64,
}

/// A validated medicine not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMedicine {
    pub name: String,
    pub price: Price,
    pub category: Category,
    pub production_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub producer: String,
}

impl NewMedicine {
    /// Whether the production date strictly precedes the expiry date.
    pub fn has_valid_shelf_life(&self) -> bool {
        self.production_date < self.expiry_date
    }

    /// Key used to detect the same product listed twice in one pharmacy.
    pub fn product_key(&self) -> (String, String) {
        (self.name.clone(), self.producer.clone())
    }
}

/// A medicine together with its owning pharmacy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineWithPharmacy {
    pub medicine: Medicine,
    pub pharmacy: Pharmacy,
}

/// Store-side filter for medicine reads. `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MedicineFilter {
    pub category: Option<Category>,
    pub non_stop: Option<bool>,
}

impl MedicineFilter {
    /// Medicines of one category sold by round-the-clock pharmacies.
    pub fn non_stop_in(category: Category) -> Self {
        Self {
            category: Some(category),
            non_stop: Some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes() {
        assert_eq!(Category::from_code(0), Some(Category::Analgesic));
        assert_eq!(Category::from_code(4), Some(Category::Vaccine));
        assert_eq!(Category::from_code(5), None);
        assert_eq!(Category::from_code(-1), None);

        for category in Category::ALL {
            assert_eq!(Category::from_code(category.code()), Some(category));
        }
    }

    #[test]
    fn test_price_formatting() {
        assert_eq!(Price::from_cents(1250).to_string(), "12.50");
        assert_eq!(Price::from_cents(1).to_string(), "0.01");
        assert_eq!(Price::from_cents(100000).to_string(), "1000.00");
    }

    fn price_of(text: &str) -> String {
        Price::from_decimal(&Decimal::parse(text).unwrap())
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_price_rounds_half_away_from_zero() {
        assert_eq!(price_of("9.999"), "10.00");
        assert_eq!(price_of("4.125"), "4.13");
        // Halves with no exact binary representation
        assert_eq!(price_of("1.005"), "1.01");
        assert_eq!(price_of("1.015"), "1.02");
        assert_eq!(price_of("2.675"), "2.68");
        assert_eq!(price_of("1.0049999"), "1.00");
        assert_eq!(price_of("-1.005"), "-1.01");
        assert_eq!(price_of(".5"), "0.50");
        assert!(Price::from_decimal(&Decimal::parse("99999999999999999999").unwrap()).is_none());
    }

    #[test]
    fn test_decimal_parse_and_order() {
        assert_eq!(Decimal::parse("007.500"), Decimal::parse("7.5"));
        assert_eq!(Decimal::parse("-0.00"), Decimal::parse("0"));
        assert_eq!(Decimal::parse("12.50").unwrap().to_string(), "12.5");
        assert_eq!(Decimal::from_cents(100_000).to_string(), "1000");
        assert_eq!(Decimal::from_cents(-5).to_string(), "-0.05");
        for bad in ["", ".", "-", "1e3", "NaN", "12,50", "1.2.3", " 1"] {
            assert_eq!(Decimal::parse(bad), None, "{bad:?}");
        }

        let max = Decimal::from_cents(100_000);
        assert!(Decimal::parse("1000.0000000000000001").unwrap() > max);
        assert!(Decimal::parse("999.9999999999999999").unwrap() < max);
        assert_eq!(Decimal::parse("1000.00").unwrap(), max);
        assert!(Decimal::parse("0.009").unwrap() < Decimal::from_cents(1));
        assert!(Decimal::parse("-3").unwrap() < Decimal::parse("-2.5").unwrap());
        assert!(Decimal::parse("-3").unwrap() < Decimal::from_cents(0));
    }

    #[test]
    fn test_shelf_life() {
        let mut medicine = NewMedicine {
            name: "Ibuprofen".into(),
            price: Price::from_cents(500),
            category: Category::Analgesic,
            production_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            producer: "Pfizer".into(),
        };
        assert!(medicine.has_valid_shelf_life());

        medicine.expiry_date = medicine.production_date;
        assert!(!medicine.has_valid_shelf_life());
    }
}
