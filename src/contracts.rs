//! Typed views over the protocol contracts the dashboard talks to.
//!
//! Read methods go through a [`Provider`]. Write methods only build the
//! [`TransactionRequest`]; submitting and awaiting it is up to the caller.

use crate::{
    abi::{self, Token},
    errors::ProviderError,
    primitives::Address,
    provider::{Provider, TransactionRequest},
};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

fn to_u64(value: &BigUint, what: &str) -> Result<u64, ProviderError> {
    value.to_u64().ok_or_else(|| ProviderError::Decode(format!("{} {} exceeds u64", what, value)))
}

fn transaction(
    from: Address,
    to: Address,
    signature: &str,
    args: &[Token],
    gas_price: BigUint,
) -> Result<TransactionRequest, ProviderError> {
    Ok(TransactionRequest {
        from,
        to,
        data: abi::encode_call(signature, args)?,
        gas_price: Some(gas_price),
    })
}

/// An ERC-20 token contract.
#[derive(Debug, Clone, Copy)]
pub struct Erc20 {
    pub address: Address,
}

impl Erc20 {
    pub fn new(address: Address) -> Self {
        Erc20 {
            address,
        }
    }

    pub async fn balance_of<P: Provider + ?Sized>(
        &self,
        provider: &P,
        owner: &Address,
    ) -> Result<BigUint, ProviderError> {
        let data = abi::encode_call("balanceOf(address)", &[Token::Address(*owner)])?;
        abi::decode_uint(&provider.call(&self.address, data).await?)
    }

    pub async fn allowance<P: Provider + ?Sized>(
        &self,
        provider: &P,
        owner: &Address,
        spender: &Address,
    ) -> Result<BigUint, ProviderError> {
        let data = abi::encode_call("allowance(address,address)", &[
            Token::Address(*owner),
            Token::Address(*spender),
        ])?;
        abi::decode_uint(&provider.call(&self.address, data).await?)
    }

    pub fn approve(
        &self,
        from: Address,
        spender: Address,
        amount: BigUint,
        gas_price: BigUint,
    ) -> Result<TransactionRequest, ProviderError> {
        transaction(
            from,
            self.address,
            "approve(address,uint256)",
            &[Token::Address(spender), Token::Uint(amount)],
            gas_price,
        )
    }
}

/// A user's position in a bond depository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondInfo {
    /// Remaining payout, in KANDY smallest units.
    pub payout:      BigUint,
    /// Blocks left until fully vested.
    pub vesting:     u64,
    /// Block of the last interaction.
    pub last_update: u64,
    pub price_paid:  BigUint,
}

impl BondInfo {
    /// Block at which the position is fully vested.
    pub fn maturation_block(&self) -> u64 { self.vesting.saturating_add(self.last_update) }
}

/// A bond depository contract.
#[derive(Debug, Clone, Copy)]
pub struct BondDepository {
    pub address: Address,
}

impl BondDepository {
    pub fn new(address: Address) -> Self {
        BondDepository {
            address,
        }
    }

    pub async fn bond_info<P: Provider + ?Sized>(
        &self,
        provider: &P,
        depositor: &Address,
    ) -> Result<BondInfo, ProviderError> {
        let data = abi::encode_call("bondInfo(address)", &[Token::Address(*depositor)])?;
        let mut words = abi::decode_uints(&provider.call(&self.address, data).await?, 4)?;
        let price_paid = words.pop().unwrap_or_default();
        let last_update = to_u64(&words[2], "last update")?;
        let vesting = to_u64(&words[1], "vesting")?;
        Ok(BondInfo {
            payout: words.swap_remove(0),
            vesting,
            last_update,
            price_paid,
        })
    }

    pub async fn pending_payout_for<P: Provider + ?Sized>(
        &self,
        provider: &P,
        depositor: &Address,
    ) -> Result<BigUint, ProviderError> {
        let data = abi::encode_call("pendingPayoutFor(address)", &[Token::Address(*depositor)])?;
        abi::decode_uint(&provider.call(&self.address, data).await?)
    }
}

/// The wrapped, non-rebasing wsKANDY token.
#[derive(Debug, Clone, Copy)]
pub struct WrappedToken {
    pub token: Erc20,
}

impl WrappedToken {
    pub fn new(address: Address) -> Self {
        WrappedToken {
            token: Erc20::new(address),
        }
    }

    /// Amount of wsKANDY (18 decimals) an sKANDY amount (9 decimals) wraps to.
    pub async fn skandy_to_wskandy<P: Provider + ?Sized>(
        &self,
        provider: &P,
        amount: BigUint,
    ) -> Result<BigUint, ProviderError> {
        let data = abi::encode_call("sKANDYTowsKANDY(uint256)", &[Token::Uint(amount)])?;
        abi::decode_uint(&provider.call(&self.token.address, data).await?)
    }

    /// Amount of sKANDY (9 decimals) a wsKANDY amount (18 decimals) unwraps to.
    pub async fn wskandy_to_skandy<P: Provider + ?Sized>(
        &self,
        provider: &P,
        amount: BigUint,
    ) -> Result<BigUint, ProviderError> {
        let data = abi::encode_call("wsKANDYTosKANDY(uint256)", &[Token::Uint(amount)])?;
        abi::decode_uint(&provider.call(&self.token.address, data).await?)
    }

    pub fn wrap(
        &self,
        from: Address,
        amount: BigUint,
        gas_price: BigUint,
    ) -> Result<TransactionRequest, ProviderError> {
        transaction(from, self.token.address, "wrap(uint256)", &[Token::Uint(amount)], gas_price)
    }

    pub fn unwrap(
        &self,
        from: Address,
        amount: BigUint,
        gas_price: BigUint,
    ) -> Result<TransactionRequest, ProviderError> {
        transaction(from, self.token.address, "unwrap(uint256)", &[Token::Uint(amount)], gas_price)
    }
}

/// Current staking epoch. Its end time is the next rebase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Epoch {
    pub number:     u64,
    pub distribute: BigUint,
    pub length:     u64,
    pub end_time:   u64,
}

#[derive(Debug, Clone, Copy)]
pub struct Staking {
    pub address: Address,
}

impl Staking {
    pub fn new(address: Address) -> Self {
        Staking {
            address,
        }
    }

    pub async fn epoch<P: Provider + ?Sized>(&self, provider: &P) -> Result<Epoch, ProviderError> {
        let data = abi::encode_call("epoch()", &[])?;
        let words = abi::decode_uints(&provider.call(&self.address, data).await?, 4)?;
        Ok(Epoch {
            number:     to_u64(&words[0], "epoch number")?,
            distribute: words[1].clone(),
            length:     to_u64(&words[2], "epoch length")?,
            end_time:   to_u64(&words[3], "epoch end time")?,
        })
    }
}

/// A constant-product liquidity pair.
#[derive(Debug, Clone, Copy)]
pub struct LpReserve {
    pub address: Address,
}

impl LpReserve {
    pub fn new(address: Address) -> Self {
        LpReserve {
            address,
        }
    }

    /// Returns `(reserve0, reserve1)`.
    pub async fn get_reserves<P: Provider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<(BigUint, BigUint), ProviderError> {
        let data = abi::encode_call("getReserves()", &[])?;
        let mut words = abi::decode_uints(&provider.call(&self.address, data).await?, 2)?;
        let reserve1 = words.pop().unwrap_or_default();
        let reserve0 = words.pop().unwrap_or_default();
        Ok((reserve0, reserve1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maturation_is_vesting_plus_last_update() {
        let info = BondInfo {
            payout:      BigUint::from(5u32),
            vesting:     432_000,
            last_update: 1_000_000,
            price_paid:  BigUint::from(0u32),
        };
        assert_eq!(info.maturation_block(), 1_432_000);
    }

    #[test]
    fn write_calls_carry_gas_price_and_calldata() {
        let wrapped = WrappedToken::new(Address([2; 20]));
        let tx = wrapped.wrap(Address([1; 20]), BigUint::from(10u32), BigUint::from(25u32)).unwrap();
        assert_eq!(tx.to, Address([2; 20]));
        assert_eq!(tx.from, Address([1; 20]));
        assert_eq!(tx.gas_price, Some(BigUint::from(25u32)));
        assert_eq!(&tx.data[..4], &abi::selector("wrap(uint256)"));
        assert_eq!(tx.data[35], 10);
    }
}
