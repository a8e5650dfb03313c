//! Registry of the bonds offered by the protocol.
//!
//! Pure configuration data. A bond that has no entry for a network is simply
//! not offered there.

use crate::{network::Network, primitives::Address};
use num_bigint::BigUint;

/// Decode a `0x`-prefixed address at compile time.
pub(crate) const fn addr(s: &str) -> Address {
    const fn nibble(c: u8) -> u8 {
        match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            b'A'..=b'F' => c - b'A' + 10,
            _ => panic!("invalid hex digit in address"),
        }
    }
    let bytes = s.as_bytes();
    assert!(bytes.len() == 42 && bytes[0] == b'0' && bytes[1] == b'x', "malformed address");
    let mut out = [0u8; 20];
    let mut i = 0;
    while i < 20 {
        out[i] = (nibble(bytes[2 + 2 * i]) << 4) | nibble(bytes[3 + 2 * i]);
        i += 1;
    }
    Address(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondKind {
    /// Bond paid in a stablecoin reserve.
    Stable,
    /// Bond paid in a non-stable single asset, e.g. wrapped AVAX.
    Custom,
    /// Bond paid in KANDY-stablecoin LP tokens.
    Lp,
    /// Bond paid in KANDY-asset LP tokens.
    CustomLp,
}

/// Contracts backing a bond on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondAddresses {
    pub bond_address:    Address,
    pub reserve_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondDescriptor {
    pub name:               &'static str,
    pub display_name:       &'static str,
    pub kind:               BondKind,
    /// Symbol of the token the bond is priced in.
    pub bond_token:         &'static str,
    pub icon:               &'static str,
    pub networks:           &'static [(Network, BondAddresses)],
    /// Raw amount the treasury holds in strategies for this reserve.
    pub tokens_in_strategy: Option<&'static str>,
    /// Where to obtain the LP token.
    pub lp_url:             Option<&'static str>,
}

impl BondDescriptor {
    pub fn is_lp(&self) -> bool { matches!(self.kind, BondKind::Lp | BondKind::CustomLp) }

    fn addresses(&self, network: Network) -> Option<&BondAddresses> {
        self.networks.iter().find(|(n, _)| *n == network).map(|(_, a)| a)
    }

    pub fn tokens_in_strategy(&self) -> Option<BigUint> {
        self.tokens_in_strategy.and_then(|s| s.parse().ok())
    }
}

pub static MIM: BondDescriptor = BondDescriptor {
    name:               "mim",
    display_name:       "MIM",
    kind:               BondKind::Stable,
    bond_token:         "MIM",
    icon:               "MIM.svg",
    networks:           &[(Network::Avax, BondAddresses {
        bond_address:    addr("0x07df32EF3159c784a12E58dAf9d32eB236a30D6f"),
        reserve_address: addr("0x130966628846BFd36ff31a822705796e8cb8C18D"),
    })],
    tokens_in_strategy: Some("60500000000000000000000000"),
    lp_url:             None,
};

pub static WAVAX: BondDescriptor = BondDescriptor {
    name:               "wavax",
    display_name:       "wAVAX",
    kind:               BondKind::Custom,
    bond_token:         "AVAX",
    icon:               "AVAX.svg",
    networks:           &[(Network::Avax, BondAddresses {
        bond_address:    addr("0xfcbd66A7D4674Bba16764Ea413e7f070A8Aa1e2f"),
        reserve_address: addr("0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7"),
    })],
    tokens_in_strategy: Some("756916000000000000000000"),
    lp_url:             None,
};

pub static MIM_KANDY: BondDescriptor = BondDescriptor {
    name:               "mim_time_lp",
    display_name:       "KANDY-MIM LP",
    kind:               BondKind::Lp,
    bond_token:         "MIM",
    icon:               "KANDY-MIM.png",
    networks:           &[(Network::Avax, BondAddresses {
        bond_address:    addr("0xd0023548349FeD39e1CAB232D02766E40067ADE0"),
        reserve_address: addr("0xf12B055625200a6e30c35424b9F02A76BCF9d106"),
    })],
    tokens_in_strategy: None,
    lp_url:             Some(
        "https://www.traderjoexyz.com/#/pool/0x130966628846BFd36ff31a822705796e8cb8C18D/0x3e02f97774da99fB897FB08bF16E63A1706C41Bd",
    ),
};

pub static AVAX_KANDY: BondDescriptor = BondDescriptor {
    name:               "avax_time_lp",
    display_name:       "KANDY-AVAX LP",
    kind:               BondKind::CustomLp,
    bond_token:         "AVAX",
    icon:               "KANDY-AVAX.png",
    networks:           &[(Network::Avax, BondAddresses {
        bond_address:    addr("0x46207878E76D903f830980A42Ec16716ae655369"),
        reserve_address: addr("0xD20d23772324737A6FD376002DC8E0842bA4551a"),
    })],
    tokens_in_strategy: None,
    lp_url:             Some(
        "https://www.traderjoexyz.com/#/pool/AVAX/0x3e02f97774da99fB897FB08bF16E63A1706C41Bd",
    ),
};

static BONDS: [&BondDescriptor; 4] = [&MIM, &WAVAX, &MIM_KANDY, &AVAX_KANDY];

/// All bonds, in display order.
pub fn list_bonds() -> impl Iterator<Item = &'static BondDescriptor> { BONDS.iter().copied() }

pub fn find_bond(name: &str) -> Option<&'static BondDescriptor> {
    list_bonds().find(|b| b.name == name)
}

/// Bond depository address of `bond` on `network`, if it is offered there.
pub fn address_for_network(bond: &BondDescriptor, network: Network) -> Option<Address> {
    bond.addresses(network).map(|a| a.bond_address)
}

/// Reserve token address of `bond` on `network`, if it is offered there.
pub fn reserve_address_for_network(bond: &BondDescriptor, network: Network) -> Option<Address> {
    bond.addresses(network).map(|a| a.reserve_address)
}
