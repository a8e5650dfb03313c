//! Fixed-size chain identifiers.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Can't parse <{input}> as a {expected}-byte hex string")]
pub struct HexParseError {
    input:    String,
    expected: usize,
}

fn parse_fixed_hex<const N: usize>(input: &str) -> Result<[u8; N], HexParseError> {
    let err = || HexParseError {
        input:    input.to_owned(),
        expected: N,
    };
    let digits = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")).unwrap_or(input);
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|_| err())?;
    Ok(out)
}

/// A 20-byte account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The address left-padded into a 32-byte ABI word.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl FromStr for Address {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_fixed_hex(s).map(Address) }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Hash identifying a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash(pub [u8; 32]);

impl FromStr for TxHash {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_fixed_hex(s).map(TxHash) }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

macro_rules! string_serde {
    ($t:ty, $what:literal) => {
        impl Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer, {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<$t, D::Error>
            where
                D: Deserializer<'de>, {
                let s: String = Deserialize::deserialize(deserializer)?;
                s.parse().map_err(|_| {
                    de::Error::custom(format!("Failed deserializing string '{}' as {}", s, $what))
                })
            }
        }
    };
}

string_serde!(Address, "Address");
string_serde!(TxHash, "TxHash");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parses_with_and_without_prefix() {
        let a: Address = "0x130966628846BFd36ff31a822705796e8cb8C18D".parse().unwrap();
        let b: Address = "130966628846bfd36ff31a822705796e8cb8c18d".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0x130966628846bfd36ff31a822705796e8cb8c18d");
    }

    #[test]
    fn address_rejects_wrong_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz0966628846BFd36ff31a822705796e8cb8C18D".parse::<Address>().is_err());
    }

    #[test]
    fn address_word_is_left_padded() {
        let a = Address([0xab; 20]);
        let word = a.to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &[0xab; 20]);
    }
}
