//! Supported networks and the protocol contract address book.
//!
//! Every protocol address is optional. A missing address means the contract
//! is not deployed on that network, and reads against it default to zero.

use crate::primitives::Address;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, fs, path::Path, str::FromStr};

/// Chains the dashboard knows about, keyed by chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Network {
    Avax,
}

impl Network {
    pub fn chain_id(self) -> u64 {
        match self {
            Network::Avax => 43114,
        }
    }

    pub fn from_chain_id(id: u64) -> Option<Self> {
        match id {
            43114 => Some(Network::Avax),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Avax => write!(f, "avax"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown network '{0}'")]
pub struct UnknownNetworkError(String);

impl FromStr for Network {
    type Err = UnknownNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "avax" | "avalanche" => Ok(Network::Avax),
            other => other
                .parse::<u64>()
                .ok()
                .and_then(Network::from_chain_id)
                .ok_or_else(|| UnknownNetworkError(s.to_owned())),
        }
    }
}

/// Protocol contract addresses on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkAddresses {
    pub kandy:          Option<Address>,
    pub skandy:         Option<Address>,
    pub wskandy:        Option<Address>,
    pub staking:        Option<Address>,
    pub staking_helper: Option<Address>,
    pub zapin:          Option<Address>,
}

#[derive(Debug, thiserror::Error)]
pub enum AddressBookError {
    #[error("Can't read address book: {0}")]
    Io(#[from] std::io::Error),
    #[error("Can't parse address book: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{0}")]
    Network(#[from] UnknownNetworkError),
}

/// Address book for all configured networks.
///
/// The TOML form has one table per network:
///
/// ```toml
/// [avax]
/// kandy = "0x..."
/// skandy = "0x..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    networks: BTreeMap<Network, NetworkAddresses>,
}

impl AddressBook {
    pub fn from_toml_str(input: &str) -> Result<Self, AddressBookError> {
        let raw: BTreeMap<String, NetworkAddresses> = toml::from_str(input)?;
        let mut networks = BTreeMap::new();
        for (name, addresses) in raw {
            networks.insert(name.parse::<Network>()?, addresses);
        }
        Ok(AddressBook {
            networks,
        })
    }

    pub fn load(path: &Path) -> Result<Self, AddressBookError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn insert(&mut self, network: Network, addresses: NetworkAddresses) {
        self.networks.insert(network, addresses);
    }

    /// Addresses for `network`. A network missing from the book has
    /// nothing configured.
    pub fn addresses(&self, network: Network) -> NetworkAddresses {
        self.networks.get(&network).cloned().unwrap_or_default()
    }
}
