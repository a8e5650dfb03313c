//! Conversion between native integer token amounts and their decimal display
//! form.
//!
//! On chain every amount is an unsigned integer counted in the token's
//! smallest unit. The numerical amount represented is `raw * 10^(-decimals)`.
//! Amounts only enter the store as [`DisplayAmount`], so a field never holds
//! a mix of the two representations.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Decimals of the rebasing tokens (KANDY, sKANDY) and of bond payouts.
pub const GWEI_DECIMALS: u8 = 9;
/// Decimals of the wrapped token, of the native asset and of reserve tokens.
pub const ETHER_DECIMALS: u8 = 18;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid decimal amount '{0}'")]
    Malformed(String),
    #[error("Fractional component of '{input}' exceeds {decimals} decimals")]
    TooPrecise {
        input:    String,
        decimals: u8,
    },
}

/// An amount already scaled by its token's decimal exponent, kept as the
/// canonical decimal string, e.g. `"12.5"` or `"0.0"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayAmount(String);

impl DisplayAmount {
    pub fn zero() -> Self { DisplayAmount("0.0".to_owned()) }

    /// Scale a native integer amount into display form.
    pub fn from_raw(raw: &BigUint, decimals: u8) -> Self { DisplayAmount(format_units(raw, decimals)) }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn is_zero(&self) -> bool { self.0.chars().all(|c| c == '0' || c == '.') }
}

impl Default for DisplayAmount {
    fn default() -> Self { Self::zero() }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for DisplayAmount {
    type Err = AmountError;

    /// Accepts any decimal string and normalizes it. Since the exponent is
    /// unknown here, the string is checked against the widest one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = parse_units(s, ETHER_DECIMALS)?;
        Ok(DisplayAmount::from_raw(&raw, ETHER_DECIMALS))
    }
}

fn ten_pow(decimals: u8) -> BigUint { BigUint::from(10u32).pow(u32::from(decimals)) }

/// Render `raw * 10^(-decimals)` as a decimal string. Trailing fractional
/// zeros are dropped but at least one fractional digit is always kept.
pub fn format_units(raw: &BigUint, decimals: u8) -> String {
    if decimals == 0 {
        return format!("{}.0", raw);
    }
    let scale = ten_pow(decimals);
    let whole = raw / &scale;
    let fraction = raw % &scale;
    let mut fraction = format!("{:0>width$}", fraction.to_string(), width = usize::from(decimals));
    while fraction.len() > 1 && fraction.ends_with('0') {
        fraction.pop();
    }
    format!("{}.{}", whole, fraction)
}

/// Parse a non-negative decimal string into native integer form at the given
/// exponent. More fractional digits than `decimals` is an error rather than
/// a silent truncation.
pub fn parse_units(input: &str, decimals: u8) -> Result<BigUint, AmountError> {
    let trimmed = input.trim();
    let malformed = || AmountError::Malformed(input.to_owned());
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(malformed());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(malformed());
    }
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > usize::from(decimals) {
        return Err(AmountError::TooPrecise {
            input: input.to_owned(),
            decimals,
        });
    }
    let whole = if whole.is_empty() {
        BigUint::zero()
    } else {
        whole.parse::<BigUint>().map_err(|_| malformed())?
    };
    let padded = format!("{:0<width$}", fraction, width = usize::from(decimals));
    let fraction = if padded.is_empty() {
        BigUint::zero()
    } else {
        padded.parse::<BigUint>().map_err(|_| malformed())?
    };
    Ok(whole * ten_pow(decimals) + fraction)
}

/// `raw / 10^decimals` as a float. Used where the dashboard shows a plain
/// number, e.g. a ratio of reserves.
pub fn to_f64_scaled(raw: &BigUint, decimals: u8) -> f64 {
    raw.to_f64().unwrap_or(f64::INFINITY) / 10f64.powi(i32::from(decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn formats_like_the_wallet_does() {
        assert_eq!(format_units(&BigUint::from(0u32), 9), "0.0");
        assert_eq!(format_units(&BigUint::from(1_000_000_000u64), 9), "1.0");
        assert_eq!(format_units(&BigUint::from(1_500_000_000u64), 9), "1.5");
        assert_eq!(format_units(&BigUint::from(1u32), 9), "0.000000001");
        assert_eq!(format_units(&BigUint::from(12_345u32), 0), "12345.0");
        assert_eq!(
            format_units(&"1000000000000000000000".parse::<BigUint>().unwrap(), 18),
            "1000.0"
        );
    }

    #[test]
    fn parses_whole_and_fractional_input() {
        assert_eq!(parse_units("10", 9).unwrap(), BigUint::from(10_000_000_000u64));
        assert_eq!(parse_units("0.5", 9).unwrap(), BigUint::from(500_000_000u64));
        assert_eq!(parse_units(".5", 9).unwrap(), BigUint::from(500_000_000u64));
        assert_eq!(parse_units("3.", 9).unwrap(), BigUint::from(3_000_000_000u64));
        assert_eq!(parse_units("1.10", 1).unwrap(), BigUint::from(11u32));
        assert_eq!(
            parse_units("10", 18).unwrap(),
            "10000000000000000000".parse::<BigUint>().unwrap()
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(parse_units("", 9), Err(AmountError::Malformed(_))));
        assert!(matches!(parse_units(".", 9), Err(AmountError::Malformed(_))));
        assert!(matches!(parse_units("-1", 9), Err(AmountError::Malformed(_))));
        assert!(matches!(parse_units("1e9", 9), Err(AmountError::Malformed(_))));
        assert!(matches!(parse_units("1.2.3", 9), Err(AmountError::Malformed(_))));
        assert_eq!(
            parse_units("0.0000000001", 9),
            Err(AmountError::TooPrecise {
                input:    "0.0000000001".to_owned(),
                decimals: 9,
            })
        );
    }

    #[test]
    fn display_amount_zero_detection() {
        assert!(DisplayAmount::zero().is_zero());
        assert!(DisplayAmount::from_raw(&BigUint::zero(), 18).is_zero());
        assert!(!DisplayAmount::from_raw(&BigUint::from(1u32), 18).is_zero());
        assert_eq!("2.50".parse::<DisplayAmount>().unwrap().as_str(), "2.5");
    }

    quickcheck! {
        fn format_then_parse_round_trips(raw: u128, decimals: u8) -> bool {
            let decimals = decimals % 30;
            let raw = BigUint::from(raw);
            parse_units(&format_units(&raw, decimals), decimals) == Ok(raw)
        }
    }
}
