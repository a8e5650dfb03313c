//! The dashboard state container.
//!
//! State is split into slices. Every change is a typed [`Patch`] applied
//! through [`Store::apply`]. All patches funnel through one
//! [`watch`](tokio::sync::watch) channel, so updates are serialized and every
//! subscriber observes whole snapshots.

use crate::{amount::DisplayAmount, primitives::TxHash};
use std::{collections::BTreeMap, fmt, sync::Arc};
use tokio::sync::watch;

/// Balances of the three protocol tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    pub kandy:   DisplayAmount,
    pub skandy:  DisplayAmount,
    pub wskandy: DisplayAmount,
}

/// Allowances granted to the staking contracts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StakingAllowances {
    /// KANDY approved for the staking helper.
    pub kandy:  DisplayAmount,
    /// sKANDY approved for the staking contract, needed to unstake.
    pub skandy: DisplayAmount,
}

/// Allowance granted to the wrapping contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrappingAllowance {
    /// sKANDY approved for wsKANDY.
    pub skandy: DisplayAmount,
}

/// A user's position in one bond.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserBondState {
    pub bond:             String,
    pub display_name:     String,
    pub icon:             String,
    pub is_lp:            bool,
    pub allowance:        DisplayAmount,
    pub balance:          DisplayAmount,
    pub native_balance:   DisplayAmount,
    pub interest_due:     DisplayAmount,
    pub maturation_block: u64,
    pub pending_payout:   DisplayAmount,
}

/// A user's holdings of one zap token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTokenState {
    pub token:     String,
    pub address:   String,
    pub icon:      String,
    pub allowance: DisplayAmount,
    pub balance:   DisplayAmount,
    pub is_native: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub loading:  bool,
    pub balances: Balances,
    pub staking:  StakingAllowances,
    pub wrapping: WrappingAllowance,
    pub bonds:    BTreeMap<String, UserBondState>,
    pub tokens:   BTreeMap<String, UserTokenState>,
}

impl Default for AccountState {
    fn default() -> Self {
        AccountState {
            loading:  true,
            balances: Default::default(),
            staking:  Default::default(),
            wrapping: Default::default(),
            bonds:    Default::default(),
            tokens:   Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapState {
    pub loading:    bool,
    /// Preview of the converted amount. `None` while no amount is entered.
    pub wrap_value: Option<DisplayAmount>,
}

impl Default for WrapState {
    fn default() -> Self {
        WrapState {
            loading:    true,
            wrap_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub loading:            bool,
    pub current_block:      Option<u64>,
    /// Timestamp of the latest block, seconds since the epoch.
    pub current_block_time: Option<u64>,
    /// Timestamp at which the current staking epoch ends.
    pub next_rebase:        Option<u64>,
    pub market_price:       Option<f64>,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            loading:            true,
            current_block:      None,
            current_block_time: None,
            next_rebase:        None,
            market_price:       None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingTxnKind {
    ApproveWrapping,
    Wrapping,
    Unwrapping,
}

impl fmt::Display for PendingTxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingTxnKind::ApproveWrapping => write!(f, "approve_wrapping"),
            PendingTxnKind::Wrapping => write!(f, "wrapping"),
            PendingTxnKind::Unwrapping => write!(f, "unwrapping"),
        }
    }
}

/// A submitted but not yet confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTxn {
    pub hash: TxHash,
    pub text: String,
    pub kind: PendingTxnKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub account:      AccountState,
    pub wrap:         WrapState,
    pub app:          AppState,
    pub pending_txns: Vec<PendingTxn>,
}

/// Partial update of the account slice. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub loading:  Option<bool>,
    pub balances: Option<Balances>,
    pub staking:  Option<StakingAllowances>,
    pub wrapping: Option<WrappingAllowance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapPatch {
    pub loading:    Option<bool>,
    pub wrap_value: Option<Option<DisplayAmount>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppPatch {
    pub loading:            Option<bool>,
    pub current_block:      Option<u64>,
    pub current_block_time: Option<u64>,
    pub next_rebase:        Option<u64>,
    pub market_price:       Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Account(AccountPatch),
    /// Replace the entry for `UserBondState::bond`.
    Bond(UserBondState),
    /// Replace the entry for `UserTokenState::token`.
    Token(UserTokenState),
    Wrap(WrapPatch),
    App(AppPatch),
    AddPendingTxn(PendingTxn),
    ClearPendingTxn(TxHash),
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *field = v;
    }
}

impl DashboardState {
    fn apply(&mut self, patch: Patch) {
        match patch {
            Patch::Account(p) => {
                set(&mut self.account.loading, p.loading);
                set(&mut self.account.balances, p.balances);
                set(&mut self.account.staking, p.staking);
                set(&mut self.account.wrapping, p.wrapping);
            }
            Patch::Bond(bond) => {
                self.account.bonds.insert(bond.bond.clone(), bond);
            }
            Patch::Token(token) => {
                self.account.tokens.insert(token.token.clone(), token);
            }
            Patch::Wrap(p) => {
                set(&mut self.wrap.loading, p.loading);
                set(&mut self.wrap.wrap_value, p.wrap_value);
            }
            Patch::App(p) => {
                set(&mut self.app.loading, p.loading);
                set(&mut self.app.current_block, p.current_block.map(Some));
                set(&mut self.app.current_block_time, p.current_block_time.map(Some));
                set(&mut self.app.next_rebase, p.next_rebase.map(Some));
                set(&mut self.app.market_price, p.market_price.map(Some));
            }
            Patch::AddPendingTxn(txn) => {
                if !self.pending_txns.iter().any(|t| t.hash == txn.hash) {
                    self.pending_txns.push(txn);
                }
            }
            Patch::ClearPendingTxn(hash) => self.pending_txns.retain(|t| t.hash != hash),
        }
    }
}

/// Shared handle to the dashboard state. Cloning the handle shares the state.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<watch::Sender<DashboardState>>,
}

impl Default for Store {
    fn default() -> Self { Self::new(DashboardState::default()) }
}

impl Store {
    pub fn new(initial: DashboardState) -> Self {
        let (sender, _) = watch::channel(initial);
        Store {
            inner: Arc::new(sender),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DashboardState { self.inner.borrow().clone() }

    /// Apply a patch and wake all subscribers.
    pub fn apply(&self, patch: Patch) {
        trace!("Applying {:?}", patch);
        self.inner.send_modify(|state| state.apply(patch));
    }

    /// A receiver that is notified after every applied patch.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> { self.inner.subscribe() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> DisplayAmount { s.parse().unwrap() }

    #[test]
    fn account_patch_only_touches_given_fields() {
        let store = Store::default();
        store.apply(Patch::Account(AccountPatch {
            wrapping: Some(WrappingAllowance {
                skandy: amount("5"),
            }),
            ..Default::default()
        }));
        store.apply(Patch::Account(AccountPatch {
            loading: Some(false),
            balances: Some(Balances {
                kandy: amount("1.5"),
                ..Default::default()
            }),
            ..Default::default()
        }));
        let account = store.state().account;
        assert!(!account.loading);
        assert_eq!(account.balances.kandy, amount("1.5"));
        assert_eq!(account.wrapping.skandy, amount("5"));
        assert!(account.staking.kandy.is_zero());
    }

    #[test]
    fn bond_entries_are_keyed_by_name() {
        let store = Store::default();
        for (name, block) in [("mim", 10), ("wavax", 20), ("mim", 30)] {
            store.apply(Patch::Bond(UserBondState {
                bond: name.to_owned(),
                maturation_block: block,
                ..Default::default()
            }));
        }
        let bonds = store.state().account.bonds;
        assert_eq!(bonds.len(), 2);
        assert_eq!(bonds["mim"].maturation_block, 30);
        assert_eq!(bonds["wavax"].maturation_block, 20);
    }

    #[test]
    fn pending_txns_add_and_clear() {
        let store = Store::default();
        let txn = PendingTxn {
            hash: TxHash([7; 32]),
            text: "Wrapping".to_owned(),
            kind: PendingTxnKind::Wrapping,
        };
        store.apply(Patch::AddPendingTxn(txn.clone()));
        store.apply(Patch::AddPendingTxn(txn.clone()));
        assert_eq!(store.state().pending_txns, vec![txn]);
        store.apply(Patch::ClearPendingTxn(TxHash([7; 32])));
        assert!(store.state().pending_txns.is_empty());
        assert_eq!(PendingTxnKind::ApproveWrapping.to_string(), "approve_wrapping");
    }

    #[test]
    fn wrap_value_can_be_cleared() {
        let store = Store::default();
        store.apply(Patch::Wrap(WrapPatch {
            loading:    Some(false),
            wrap_value: Some(Some(amount("3"))),
        }));
        assert_eq!(store.state().wrap.wrap_value, Some(amount("3")));
        store.apply(Patch::Wrap(WrapPatch {
            wrap_value: Some(None),
            ..Default::default()
        }));
        assert_eq!(store.state().wrap.wrap_value, None);
        assert!(!store.state().wrap.loading);
    }

    #[test]
    fn app_patch_keeps_absent_fields() {
        let store = Store::default();
        store.apply(Patch::App(AppPatch {
            loading: Some(false),
            current_block: Some(10),
            current_block_time: Some(1000),
            next_rebase: Some(2000),
            market_price: Some(1.5),
        }));
        store.apply(Patch::App(AppPatch {
            current_block: Some(11),
            ..Default::default()
        }));
        let app = store.state().app;
        assert_eq!(app.current_block, Some(11));
        assert_eq!(app.current_block_time, Some(1000));
        assert_eq!(app.next_rebase, Some(2000));
        assert_eq!(app.market_price, Some(1.5));
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn subscribers_see_patches() {
        let store = Store::default();
        let mut rx = store.subscribe();
        let writer = store.clone();
        tokio::spawn(async move {
            writer.apply(Patch::App(AppPatch {
                current_block_time: Some(100),
                next_rebase: Some(200),
                ..Default::default()
            }));
        });
        rx.changed().await.unwrap();
        let app = rx.borrow().app.clone();
        assert_eq!(app.current_block_time, Some(100));
        assert_eq!(app.next_rebase, Some(200));
        assert!(app.loading);
    }
}
