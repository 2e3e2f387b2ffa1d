use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::error::BrCodeError;

/// Largest value whose wire form still fits the 13-character amount
/// field: 9999999999.99
const MAX_CENTAVOS: u64 = 999_999_999_999;

/// A BRL amount in centavos.
///
/// The payload carries amounts as decimal strings with exactly two
/// fraction digits; storing centavos makes that rendering exact and
/// keeps float rounding out of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount(u64);

impl Amount {
    pub fn from_centavos(centavos: u64) -> Result<Self, BrCodeError> {
        if centavos == 0 {
            return Err(BrCodeError::InvalidAmount("must be greater than zero"));
        }
        if centavos > MAX_CENTAVOS {
            return Err(BrCodeError::InvalidAmount("too large for the amount field"));
        }
        Ok(Self(centavos))
    }

    /// Convert a float amount in reais. Values that do not land on a
    /// whole centavo are rejected rather than silently rounded.
    pub fn from_reais(value: f64) -> Result<Self, BrCodeError> {
        if !value.is_finite() {
            return Err(BrCodeError::InvalidAmount("not a finite number"));
        }
        if value <= 0.0 {
            return Err(BrCodeError::InvalidAmount("must be greater than zero"));
        }
        let centavos = value * 100.0;
        if (centavos - centavos.round()).abs() > 1e-6 {
            return Err(BrCodeError::InvalidAmount(
                "not representable with two decimals",
            ));
        }
        if centavos.round() > MAX_CENTAVOS as f64 {
            return Err(BrCodeError::InvalidAmount("too large for the amount field"));
        }
        Self::from_centavos(centavos.round() as u64)
    }

    pub fn centavos(&self) -> u64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = BrCodeError;

    /// Accepts `150`, `150.0` and `150.00`; anything with signs, more
    /// than two fraction digits or non-digit characters is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BrCodeError::InvalidAmount("not a decimal number"));
        }
        if frac_part.len() > 2 || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BrCodeError::InvalidAmount(
                "at most two fraction digits allowed",
            ));
        }

        let reais: u64 = int_part
            .parse()
            .map_err(|_| BrCodeError::InvalidAmount("too large for the amount field"))?;
        let mut frac: u64 = 0;
        for b in frac_part.bytes() {
            frac = frac * 10 + u64::from(b - b'0');
        }
        if frac_part.len() == 1 {
            frac *= 10;
        }

        let centavos = reais
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or(BrCodeError::InvalidAmount("too large for the amount field"))?;
        Self::from_centavos(centavos)
    }
}

impl fmt::Display for Amount {
    /// Canonical wire form: no leading zeros beyond the integer part,
    /// always exactly two fraction digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
