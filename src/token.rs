//! Tokens accepted by the zap-in contract.

use crate::{bond::addr, primitives::Address};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub name:      &'static str,
    pub address:   Address,
    pub decimals:  u8,
    pub icon:      &'static str,
    /// The network's native asset. Its balance is read from the account, not
    /// from a contract, and it needs no allowance.
    pub is_native: bool,
}

pub static AVAX: TokenDescriptor = TokenDescriptor {
    name:      "AVAX",
    address:   Address([0u8; 20]),
    decimals:  18,
    icon:      "AVAX.svg",
    is_native: true,
};

pub static MIM: TokenDescriptor = TokenDescriptor {
    name:      "MIM",
    address:   addr("0x130966628846BFd36ff31a822705796e8cb8C18D"),
    decimals:  18,
    icon:      "MIM.svg",
    is_native: false,
};

pub static USDT_E: TokenDescriptor = TokenDescriptor {
    name:      "USDT.e",
    address:   addr("0xc7198437980c041c805A1EDcbA50c1Ce5db95118"),
    decimals:  6,
    icon:      "USDT.e.png",
    is_native: false,
};

pub static WETH_E: TokenDescriptor = TokenDescriptor {
    name:      "WETH.e",
    address:   addr("0x49D5c2BdFfac6CE2BFdB6640F4F80f226bc10bAB"),
    decimals:  18,
    icon:      "WETH.e.png",
    is_native: false,
};

pub static WBTC_E: TokenDescriptor = TokenDescriptor {
    name:      "WBTC.e",
    address:   addr("0x50b7545627a5162F82A992c33b87aDc75187B218"),
    decimals:  8,
    icon:      "WBTC.e.png",
    is_native: false,
};

static TOKENS: [&TokenDescriptor; 5] = [&AVAX, &MIM, &USDT_E, &WETH_E, &WBTC_E];

pub fn list_tokens() -> impl Iterator<Item = &'static TokenDescriptor> { TOKENS.iter().copied() }

/// Case-insensitive lookup by token name.
pub fn find_token(name: &str) -> Option<&'static TokenDescriptor> {
    list_tokens().find(|t| t.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        assert!(find_token("avax").unwrap().is_native);
        assert_eq!(find_token("usdt.e").unwrap().decimals, 6);
        assert!(find_token("DOGE").is_none());
        assert_eq!(list_tokens().filter(|t| t.is_native).count(), 1);
    }
}
