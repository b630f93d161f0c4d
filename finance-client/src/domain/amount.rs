use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Number of fractional digits every stored amount carries.
pub const AMOUNT_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("malformed amount: {0}")]
    Malformed(String),
    #[error("amount {0} has more than two decimal places")]
    TooPrecise(String),
    #[error("amount {0} is too large to carry two decimal places")]
    OutOfRange(String),
}

/// Separators used when an amount is typed or displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountFormat {
    pub thousands: char,
    pub decimal: char,
}

impl AmountFormat {
    /// `1.234,56`
    pub const fn pt_br() -> Self {
        Self {
            thousands: '.',
            decimal: ',',
        }
    }

    /// `1,234.56`
    pub const fn en_us() -> Self {
        Self {
            thousands: ',',
            decimal: '.',
        }
    }
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self::pt_br()
    }
}

/// A monetary amount with exactly two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.normalize().scale() > AMOUNT_SCALE {
            return Err(AmountError::TooPrecise(value.to_string()));
        }
        let mut rescaled = value;
        rescaled.rescale(AMOUNT_SCALE);
        // rescale keeps a smaller scale when the mantissa has no room left
        if rescaled.scale() != AMOUNT_SCALE {
            return Err(AmountError::OutOfRange(value.to_string()));
        }
        Ok(Self(rescaled))
    }

    /// Builds an amount from its value in cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, AMOUNT_SCALE))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Parses user input written with the separators of `format`.
    pub fn parse(input: &str, format: AmountFormat) -> Result<Self, AmountError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        let malformed = || AmountError::Malformed(trimmed.to_string());

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        let mut parts = body.split(format.decimal);
        let integer = parts.next().unwrap_or_default();
        let fraction = parts.next();
        if parts.next().is_some() {
            return Err(malformed());
        }

        let digits = integer_digits(integer, format.thousands).ok_or_else(malformed)?;

        let mut canonical = String::with_capacity(trimmed.len());
        if negative {
            canonical.push('-');
        }
        canonical.push_str(&digits);

        if let Some(fraction) = fraction {
            if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
                return Err(malformed());
            }
            if fraction.len() > AMOUNT_SCALE as usize {
                return Err(AmountError::TooPrecise(trimmed.to_string()));
            }
            canonical.push('.');
            canonical.push_str(fraction);
        }

        let value = Decimal::from_str(&canonical).map_err(|_| malformed())?;
        Self::new(value)
    }

    /// Renders the amount with the separators of `format`, grouping thousands.
    pub fn format(&self, format: AmountFormat) -> String {
        let plain = self.0.abs().to_string();
        let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let mut grouped = String::with_capacity(plain.len() + integer.len() / 3 + 1);
        for (i, c) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push(format.thousands);
            }
            grouped.push(c);
        }

        let sign = if self.0.is_sign_negative() && !self.0.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{grouped}{}{fraction}", format.decimal)
    }
}

/// Strips thousands separators, checking that groups after the first have three digits.
fn integer_digits(integer: &str, thousands: char) -> Option<String> {
    if integer.is_empty() {
        return None;
    }

    let groups: Vec<&str> = integer.split(thousands).collect();
    let well_formed = groups.iter().enumerate().all(|(i, group)| {
        let len_ok = if i == 0 {
            !group.is_empty() && (groups.len() == 1 || group.len() <= 3)
        } else {
            group.len() == 3
        };
        len_ok && group.chars().all(|c| c.is_ascii_digit())
    });

    well_formed.then(|| groups.concat())
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        let value =
            Decimal::from_str(trimmed).map_err(|_| AmountError::Malformed(trimmed.to_string()))?;
        Self::new(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(value).map_err(de::Error::custom)
    }
}
