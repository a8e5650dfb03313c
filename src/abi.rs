//! Minimal contract ABI encoding: function selectors, static `address` and
//! `uint256` arguments, and `uint`-only return tuples. Every contract method
//! the dashboard touches fits in this subset.

use crate::{errors::ProviderError, primitives::Address};
use num_bigint::BigUint;
use sha3::{Digest, Keccak256};

/// Size of one ABI word in bytes.
pub const WORD: usize = 32;

/// A static ABI argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(BigUint),
}

/// `2^256 - 1`, the "unlimited" allowance.
pub fn max_uint256() -> BigUint { (BigUint::from(1u32) << 256usize) - 1u32 }

/// First four bytes of the keccak-256 hash of the canonical signature, e.g.
/// `balanceOf(address)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

fn uint_word(value: &BigUint) -> Result<[u8; WORD], ProviderError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > WORD {
        return Err(ProviderError::Decode(format!("value {} does not fit in uint256", value)));
    }
    let mut word = [0u8; WORD];
    word[WORD - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// Build call data for `signature` with the given arguments.
pub fn encode_call(signature: &str, args: &[Token]) -> Result<Vec<u8>, ProviderError> {
    let mut data = Vec::with_capacity(4 + WORD * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        match arg {
            Token::Address(address) => data.extend_from_slice(&address.to_word()),
            Token::Uint(value) => data.extend_from_slice(&uint_word(value)?),
        }
    }
    Ok(data)
}

/// Decode the first `count` return words as unsigned integers. Extra trailing
/// words are ignored, since struct getters often return more than is read.
pub fn decode_uints(data: &[u8], count: usize) -> Result<Vec<BigUint>, ProviderError> {
    if data.len() < count * WORD {
        return Err(ProviderError::Decode(format!(
            "expected {} return words, got {} bytes",
            count,
            data.len()
        )));
    }
    Ok(data.chunks_exact(WORD).take(count).map(BigUint::from_bytes_be).collect())
}

/// Decode a single `uint` return value.
pub fn decode_uint(data: &[u8]) -> Result<BigUint, ProviderError> {
    decode_uints(data, 1)?.pop().ok_or_else(|| ProviderError::Decode("empty return data".into()))
}
