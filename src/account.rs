//! Read-only fetchers for the connected account.
//!
//! Every fetcher converts raw integers to [`DisplayAmount`] before returning.
//! A read against an unconfigured contract is never attempted and yields
//! zero.

use crate::{
    amount::{DisplayAmount, ETHER_DECIMALS, GWEI_DECIMALS},
    bond::{self, BondDescriptor},
    contracts::{BondDepository, Erc20},
    errors::{ClientError, ClientResult, ProviderError},
    network::{Network, NetworkAddresses},
    primitives::Address,
    provider::Provider,
    store::{Balances, StakingAllowances, UserBondState, UserTokenState, WrappingAllowance},
    token::TokenDescriptor,
};
use num_bigint::BigUint;

pub const KANDY_DECIMALS: u8 = GWEI_DECIMALS;
pub const SKANDY_DECIMALS: u8 = GWEI_DECIMALS;
pub const WSKANDY_DECIMALS: u8 = ETHER_DECIMALS;
/// Decimals of a bond's raw payout.
pub const PAYOUT_DECIMALS: u8 = GWEI_DECIMALS;
/// Decimals of bond reserve tokens and of the native asset.
pub const RESERVE_DECIMALS: u8 = ETHER_DECIMALS;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountBalances {
    pub balances: Balances,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDetails {
    pub balances: Balances,
    pub staking:  StakingAllowances,
    pub wrapping: WrappingAllowance,
}

async fn balance_or_zero<P: Provider + ?Sized>(
    provider: &P,
    token: Option<Address>,
    owner: &Address,
) -> Result<BigUint, ProviderError> {
    match token {
        Some(token) => Erc20::new(token).balance_of(provider, owner).await,
        None => Ok(BigUint::default()),
    }
}

async fn allowance_or_zero<P: Provider + ?Sized>(
    provider: &P,
    token: Option<Address>,
    owner: &Address,
    spender: Option<Address>,
) -> Result<BigUint, ProviderError> {
    match (token, spender) {
        (Some(token), Some(spender)) => {
            Erc20::new(token).allowance(provider, owner, &spender).await
        }
        _ => Ok(BigUint::default()),
    }
}

async fn balances<P: Provider + ?Sized>(
    address: &Address,
    addresses: &NetworkAddresses,
    provider: &P,
) -> Result<Balances, ProviderError> {
    let (kandy, skandy, wskandy) = futures::try_join!(
        balance_or_zero(provider, addresses.kandy, address),
        balance_or_zero(provider, addresses.skandy, address),
        balance_or_zero(provider, addresses.wskandy, address),
    )?;
    Ok(Balances {
        kandy:   DisplayAmount::from_raw(&kandy, KANDY_DECIMALS),
        skandy:  DisplayAmount::from_raw(&skandy, SKANDY_DECIMALS),
        wskandy: DisplayAmount::from_raw(&wskandy, WSKANDY_DECIMALS),
    })
}

/// Balances of KANDY, sKANDY and wsKANDY held by `address`.
pub async fn fetch_account_balances<P: Provider + ?Sized>(
    address: &Address,
    addresses: &NetworkAddresses,
    provider: &P,
) -> Result<AccountBalances, ProviderError> {
    debug!("Fetching balances of {}", address);
    Ok(AccountBalances {
        balances: balances(address, addresses, provider).await?,
    })
}

/// Balances plus the staking, unstaking and wrapping allowances of `address`.
pub async fn fetch_account_details<P: Provider + ?Sized>(
    address: &Address,
    addresses: &NetworkAddresses,
    provider: &P,
) -> Result<AccountDetails, ProviderError> {
    debug!("Fetching account details of {}", address);
    let (balances, stake, unstake, wrap) = futures::try_join!(
        balances(address, addresses, provider),
        allowance_or_zero(provider, addresses.kandy, address, addresses.staking_helper),
        allowance_or_zero(provider, addresses.skandy, address, addresses.staking),
        allowance_or_zero(provider, addresses.skandy, address, addresses.wskandy),
    )?;
    Ok(AccountDetails {
        balances,
        staking: StakingAllowances {
            kandy:  DisplayAmount::from_raw(&stake, KANDY_DECIMALS),
            skandy: DisplayAmount::from_raw(&unstake, SKANDY_DECIMALS),
        },
        wrapping: WrappingAllowance {
            skandy: DisplayAmount::from_raw(&wrap, SKANDY_DECIMALS),
        },
    })
}

/// The user's position in `bond`. Without an address (no wallet connected)
/// this returns the empty record and makes no call.
pub async fn fetch_user_bond_details<P: Provider + ?Sized>(
    address: Option<&Address>,
    bond: &BondDescriptor,
    network: Network,
    provider: &P,
) -> ClientResult<UserBondState> {
    let address = match address {
        Some(address) => address,
        None => return Ok(UserBondState::default()),
    };
    let unavailable = || ClientError::BondUnavailable {
        bond: bond.name.to_owned(),
        network,
    };
    let bond_address = bond::address_for_network(bond, network).ok_or_else(unavailable)?;
    let reserve_address = bond::reserve_address_for_network(bond, network).ok_or_else(unavailable)?;
    debug!("Fetching {} bond details of {}", bond.name, address);

    let depository = BondDepository::new(bond_address);
    let reserve = Erc20::new(reserve_address);
    let (info, pending_payout, allowance, balance, native_balance) = futures::try_join!(
        depository.bond_info(provider, address),
        depository.pending_payout_for(provider, address),
        reserve.allowance(provider, address, &bond_address),
        reserve.balance_of(provider, address),
        provider.get_balance(address),
    )?;

    Ok(UserBondState {
        bond:             bond.name.to_owned(),
        display_name:     bond.display_name.to_owned(),
        icon:             bond.icon.to_owned(),
        is_lp:            bond.is_lp(),
        allowance:        DisplayAmount::from_raw(&allowance, RESERVE_DECIMALS),
        balance:          DisplayAmount::from_raw(&balance, RESERVE_DECIMALS),
        native_balance:   DisplayAmount::from_raw(&native_balance, ETHER_DECIMALS),
        interest_due:     DisplayAmount::from_raw(&info.payout, PAYOUT_DECIMALS),
        maturation_block: info.maturation_block(),
        pending_payout:   DisplayAmount::from_raw(&pending_payout, PAYOUT_DECIMALS),
    })
}

/// The user's holdings of a zap token. The allowance is towards the zap-in
/// contract. Without an address this returns the empty record.
pub async fn fetch_user_token_details<P: Provider + ?Sized>(
    address: Option<&Address>,
    token: &TokenDescriptor,
    addresses: &NetworkAddresses,
    provider: &P,
) -> Result<UserTokenState, ProviderError> {
    let address = match address {
        Some(address) => address,
        None => return Ok(UserTokenState::default()),
    };
    debug!("Fetching {} token details of {}", token.name, address);

    if token.is_native {
        let balance = provider.get_balance(address).await?;
        return Ok(UserTokenState {
            token: token.name.to_owned(),
            icon: token.icon.to_owned(),
            balance: DisplayAmount::from_raw(&balance, token.decimals),
            is_native: true,
            ..Default::default()
        });
    }

    let erc20 = Erc20::new(token.address);
    let (allowance, balance) = futures::try_join!(
        allowance_or_zero(provider, Some(token.address), address, addresses.zapin),
        erc20.balance_of(provider, address),
    )?;
    Ok(UserTokenState {
        token:     token.name.to_owned(),
        address:   token.address.to_string(),
        icon:      token.icon.to_owned(),
        allowance: DisplayAmount::from_raw(&allowance, token.decimals),
        balance:   DisplayAmount::from_raw(&balance, token.decimals),
        is_native: false,
    })
}
