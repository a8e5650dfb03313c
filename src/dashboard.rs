//! Dispatch layer: runs fetchers, commits their results to the [`Store`] and
//! keeps the loading flags honest.
//!
//! Each operation sets its slice's loading flag right before the first
//! network call and clears it on completion or failure. A failed fetch is
//! logged and commits nothing else. The transaction flows live in
//! [`crate::wrap`].

use crate::{
    account::{self, AccountBalances, AccountDetails},
    app::{self, AppDetails},
    bond::BondDescriptor,
    errors::ClientResult,
    network::{AddressBook, Network, NetworkAddresses},
    notify::Notifier,
    primitives::Address,
    provider::Provider,
    store::{AccountPatch, AppPatch, Patch, Store, UserBondState, UserTokenState},
    token::TokenDescriptor,
};
use std::{fmt::Display, time::Duration};

/// How long to wait after a confirmed transaction before reading its effect
/// back. The read provider may lag behind the node that accepted the
/// transaction. There is no upper bound guarantee: a read that is still stale
/// after the delay is accepted as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Delay before re-reading an allowance after an approval.
    pub allowance_delay: Duration,
    /// Delay before re-fetching balances after a wrap or unwrap.
    pub balance_delay:   Duration,
}

impl RefreshPolicy {
    pub const DEFAULT_ALLOWANCE_DELAY: Duration = Duration::from_secs(2);
    pub const DEFAULT_BALANCE_DELAY: Duration = Duration::from_secs(10);

    /// No waiting at all.
    pub fn immediate() -> Self {
        RefreshPolicy {
            allowance_delay: Duration::ZERO,
            balance_delay:   Duration::ZERO,
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        RefreshPolicy {
            allowance_delay: Self::DEFAULT_ALLOWANCE_DELAY,
            balance_delay:   Self::DEFAULT_BALANCE_DELAY,
        }
    }
}

pub struct Dashboard {
    pub(crate) store:    Store,
    pub(crate) notifier: Notifier,
    address_book:        AddressBook,
    pub(crate) policy:   RefreshPolicy,
}

impl Dashboard {
    pub fn new(
        store: Store,
        notifier: Notifier,
        address_book: AddressBook,
        policy: RefreshPolicy,
    ) -> Self {
        Dashboard {
            store,
            notifier,
            address_book,
            policy,
        }
    }

    pub fn store(&self) -> &Store { &self.store }

    pub fn notifier(&self) -> &Notifier { &self.notifier }

    pub fn addresses(&self, network: Network) -> NetworkAddresses {
        self.address_book.addresses(network)
    }

    fn set_account_loading(&self, loading: bool) {
        self.store.apply(Patch::Account(AccountPatch {
            loading: Some(loading),
            ..Default::default()
        }));
    }

    fn account_failed(&self, what: &str, err: &impl Display) {
        error!("{} failed: {}", what, err);
        self.set_account_loading(false);
    }

    /// Fetch the three token balances and commit them.
    pub async fn get_balances<P: Provider + ?Sized>(
        &self,
        address: &Address,
        network: Network,
        provider: &P,
    ) -> ClientResult<AccountBalances> {
        self.set_account_loading(true);
        match account::fetch_account_balances(address, &self.addresses(network), provider).await {
            Ok(fetched) => {
                self.store.apply(Patch::Account(AccountPatch {
                    loading: Some(false),
                    balances: Some(fetched.balances.clone()),
                    ..Default::default()
                }));
                Ok(fetched)
            }
            Err(e) => {
                self.account_failed("Fetching balances", &e);
                Err(e.into())
            }
        }
    }

    /// Fetch balances and allowances and commit them.
    pub async fn load_account_details<P: Provider + ?Sized>(
        &self,
        address: &Address,
        network: Network,
        provider: &P,
    ) -> ClientResult<AccountDetails> {
        self.set_account_loading(true);
        match account::fetch_account_details(address, &self.addresses(network), provider).await {
            Ok(details) => {
                self.store.apply(Patch::Account(AccountPatch {
                    loading:  Some(false),
                    balances: Some(details.balances.clone()),
                    staking:  Some(details.staking.clone()),
                    wrapping: Some(details.wrapping.clone()),
                }));
                Ok(details)
            }
            Err(e) => {
                self.account_failed("Loading account details", &e);
                Err(e.into())
            }
        }
    }

    /// Fetch the user's position in `bond` and commit it under the bond's
    /// name. The empty record returned without an address is not committed.
    pub async fn calculate_user_bond_details<P: Provider + ?Sized>(
        &self,
        address: Option<&Address>,
        bond: &BondDescriptor,
        network: Network,
        provider: &P,
    ) -> ClientResult<UserBondState> {
        self.set_account_loading(true);
        match account::fetch_user_bond_details(address, bond, network, provider).await {
            Ok(details) => {
                if !details.bond.is_empty() {
                    self.store.apply(Patch::Bond(details.clone()));
                }
                self.set_account_loading(false);
                Ok(details)
            }
            Err(e) => {
                self.account_failed(&format!("Fetching {} bond details", bond.name), &e);
                Err(e)
            }
        }
    }

    /// Fetch the user's holdings of `token` and commit them under the
    /// token's name. The empty record returned without an address is not
    /// committed.
    pub async fn calculate_user_token_details<P: Provider + ?Sized>(
        &self,
        address: Option<&Address>,
        token: &TokenDescriptor,
        network: Network,
        provider: &P,
    ) -> ClientResult<UserTokenState> {
        self.set_account_loading(true);
        let addresses = self.addresses(network);
        match account::fetch_user_token_details(address, token, &addresses, provider).await {
            Ok(details) => {
                if !details.token.is_empty() {
                    self.store.apply(Patch::Token(details.clone()));
                }
                self.set_account_loading(false);
                Ok(details)
            }
            Err(e) => {
                self.account_failed(&format!("Fetching {} token details", token.name), &e);
                Err(e.into())
            }
        }
    }

    /// Fetch the block clock, next rebase and market price and commit them.
    pub async fn load_app_details<P: Provider + ?Sized>(
        &self,
        network: Network,
        provider: &P,
    ) -> ClientResult<AppDetails> {
        self.store.apply(Patch::App(AppPatch {
            loading: Some(true),
            ..Default::default()
        }));
        match app::fetch_app_details(&self.addresses(network), network, provider).await {
            Ok(details) => {
                self.store.apply(Patch::App(AppPatch {
                    loading:            Some(false),
                    current_block:      Some(details.current_block),
                    current_block_time: Some(details.current_block_time),
                    next_rebase:        details.next_rebase,
                    market_price:       details.market_price,
                }));
                Ok(details)
            }
            Err(e) => {
                error!("Loading app details failed: {}", e);
                self.store.apply(Patch::App(AppPatch {
                    loading: Some(false),
                    ..Default::default()
                }));
                Err(e)
            }
        }
    }
}
