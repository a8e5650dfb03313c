//! Chain-wide values shown on the dashboard: block clock, next rebase and
//! market price.

use crate::{
    amount::to_f64_scaled,
    bond,
    contracts::{LpReserve, Staking},
    errors::{ClientError, ClientResult, ProviderError},
    network::{Network, NetworkAddresses},
    provider::Provider,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AppDetails {
    pub current_block:      u64,
    pub current_block_time: u64,
    /// End of the current staking epoch. `None` without a staking contract.
    pub next_rebase:        Option<u64>,
    pub market_price:       Option<f64>,
}

/// Ratio of the KANDY-MIM pair reserves, `reserve0 / reserve1`. Both
/// reserves are taken as plain integers. With 18-decimal MIM against 9-decimal
/// KANDY the price in MIM is this value scaled by `10^-9`.
pub async fn fetch_market_price<P: Provider + ?Sized>(
    network: Network,
    provider: &P,
) -> ClientResult<f64> {
    let pair = bond::reserve_address_for_network(&bond::MIM_KANDY, network).ok_or_else(|| {
        ClientError::BondUnavailable {
            bond: bond::MIM_KANDY.name.to_owned(),
            network,
        }
    })?;
    let (reserve0, reserve1) = LpReserve::new(pair).get_reserves(provider).await?;
    Ok(to_f64_scaled(&reserve0, 0) / to_f64_scaled(&reserve1, 0))
}

async fn next_rebase<P: Provider + ?Sized>(
    addresses: &NetworkAddresses,
    provider: &P,
) -> Result<Option<u64>, ProviderError> {
    match addresses.staking {
        Some(staking) => Ok(Some(Staking::new(staking).epoch(provider).await?.end_time)),
        None => Ok(None),
    }
}

pub async fn fetch_app_details<P: Provider + ?Sized>(
    addresses: &NetworkAddresses,
    network: Network,
    provider: &P,
) -> ClientResult<AppDetails> {
    let current_block = provider.block_number().await?;
    let (current_block_time, next_rebase) = futures::try_join!(
        provider.block_timestamp(current_block),
        next_rebase(addresses, provider),
    )?;
    let market_price = match fetch_market_price(network, provider).await {
        Ok(price) => Some(price),
        Err(ClientError::BondUnavailable {
            ..
        }) => None,
        Err(e) => return Err(e),
    };
    debug!(
        "Block {} at {}, next rebase at {:?}, market price {:?}",
        current_block, current_block_time, next_rebase, market_price
    );
    Ok(AppDetails {
        current_block,
        current_block_time,
        next_rebase,
        market_price,
    })
}
