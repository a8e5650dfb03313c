//! Data and transaction layer of the KANDY dashboard.
//!
//! Fetchers read balances, allowances, bond positions and the rebase clock
//! from an EVM node and commit them to a [`store::Store`]. The wrap flow
//! submits transactions through the connected wallet and reports progress on
//! the [`notify`] channel.

#[macro_use]
extern crate log;

pub mod abi;
pub mod account;
pub mod amount;
pub mod app;
pub mod bond;
pub mod config;
pub mod contracts;
pub mod dashboard;
pub mod errors;
pub mod network;
pub mod notify;
pub mod primitives;
pub mod provider;
pub mod rebase_timer;
pub mod store;
pub mod token;
pub mod wrap;
