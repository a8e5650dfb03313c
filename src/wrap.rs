//! Wrapping sKANDY into wsKANDY and back.
//!
//! Each flow runs its steps strictly in sequence: gas price, submission,
//! pending registration, confirmation, and then the delayed read-back.
//! Wallet and node failures are classified into a user notice rather than
//! returned. Nothing is retried.

use crate::{
    abi::max_uint256,
    amount::{parse_units, DisplayAmount},
    account::{SKANDY_DECIMALS, WSKANDY_DECIMALS},
    contracts::{Erc20, WrappedToken},
    dashboard::Dashboard,
    errors::{ClientError, ClientResult, ProviderError},
    network::Network,
    notify::{messages, wallet_error_message},
    primitives::{Address, TxHash},
    provider::{Provider, Signer, TransactionRequest},
    store::{AccountPatch, Patch, PendingTxn, PendingTxnKind, WrapPatch, WrappingAllowance},
};
use num_bigint::BigUint;

/// How a transaction flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    /// No wallet is connected. The user was asked to connect one.
    WalletNotConnected,
    /// The wallet or node rejected the transaction. Holds the notice shown.
    Failed(String),
    /// The transaction was mined and its effect read back.
    Confirmed(TxHash),
}

/// Direction of a wrap operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapDirection {
    /// sKANDY to wsKANDY.
    Wrap,
    /// wsKANDY to sKANDY.
    Unwrap,
}

impl WrapDirection {
    pub fn from_is_wrap(is_wrap: bool) -> Self {
        if is_wrap {
            WrapDirection::Wrap
        } else {
            WrapDirection::Unwrap
        }
    }

    /// Decimals of the amount the user enters.
    pub fn input_decimals(self) -> u8 {
        match self {
            WrapDirection::Wrap => SKANDY_DECIMALS,
            WrapDirection::Unwrap => WSKANDY_DECIMALS,
        }
    }

    /// Decimals of the amount the user receives.
    pub fn output_decimals(self) -> u8 {
        match self {
            WrapDirection::Wrap => WSKANDY_DECIMALS,
            WrapDirection::Unwrap => SKANDY_DECIMALS,
        }
    }

    pub fn pending_text(self) -> &'static str {
        match self {
            WrapDirection::Wrap => "Wrapping",
            WrapDirection::Unwrap => "Unwrapping",
        }
    }

    pub fn pending_kind(self) -> PendingTxnKind {
        match self {
            WrapDirection::Wrap => PendingTxnKind::Wrapping,
            WrapDirection::Unwrap => PendingTxnKind::Unwrapping,
        }
    }
}

fn required(address: Option<Address>, name: &'static str) -> ClientResult<Address> {
    address.ok_or(ClientError::ContractNotConfigured(name))
}

impl Dashboard {
    /// Submit the transaction built by `build`, track it as pending until it
    /// settles and report the outcome. The pending entry is removed whatever
    /// the outcome. On failure the classified notice text is returned.
    async fn send_and_confirm<S, F>(
        &self,
        signer: &S,
        text: &str,
        kind: PendingTxnKind,
        build: F,
    ) -> Result<TxHash, String>
    where
        S: Signer + ?Sized,
        F: FnOnce(Address, BigUint) -> Result<TransactionRequest, ProviderError>, {
        let mut submitted = None;
        let result = async {
            let from = signer.signer_address().await?;
            let gas_price = signer.gas_price().await?;
            let hash = signer.send_transaction(build(from, gas_price)?).await?;
            info!("Submitted {} transaction {}", kind, hash);
            self.store.apply(Patch::AddPendingTxn(PendingTxn {
                hash,
                text: text.to_owned(),
                kind,
            }));
            submitted = Some(hash);
            signer.wait_for_transaction(&hash).await?;
            Ok::<_, ProviderError>(hash)
        }
        .await;

        let outcome = match result {
            Ok(hash) => {
                self.notifier.success(messages::TX_SUCCESSFULLY_SEND);
                Ok(hash)
            }
            Err(e) => {
                error!("{} transaction failed: {}", kind, e);
                let text = wallet_error_message(&e);
                self.notifier.error(text.clone());
                Err(text)
            }
        };
        if let Some(hash) = submitted {
            self.store.apply(Patch::ClearPendingTxn(hash));
        }
        outcome
    }

    /// Approve the wrapping contract to spend an unlimited amount of sKANDY,
    /// then read the new allowance back into the store.
    pub async fn change_approval<S: Signer + ?Sized>(
        &self,
        connection: Option<&S>,
        address: &Address,
        network: Network,
    ) -> ClientResult<TxOutcome> {
        let signer = match connection {
            Some(signer) => signer,
            None => {
                self.notifier.warning(messages::PLEASE_CONNECT_WALLET);
                return Ok(TxOutcome::WalletNotConnected);
            }
        };
        let addresses = self.addresses(network);
        let skandy = Erc20::new(required(addresses.skandy, "sKANDY")?);
        let wskandy = required(addresses.wskandy, "wsKANDY")?;

        let sent = self
            .send_and_confirm(signer, "Approve Wrapping", PendingTxnKind::ApproveWrapping, |from, gas| {
                skandy.approve(from, wskandy, max_uint256(), gas)
            })
            .await;
        let hash = match sent {
            Ok(hash) => hash,
            Err(text) => return Ok(TxOutcome::Failed(text)),
        };

        tokio::time::sleep(self.policy.allowance_delay).await;
        let allowance = skandy.allowance(signer, address, &wskandy).await?;
        self.store.apply(Patch::Account(AccountPatch {
            wrapping: Some(WrappingAllowance {
                skandy: DisplayAmount::from_raw(&allowance, SKANDY_DECIMALS),
            }),
            ..Default::default()
        }));
        Ok(TxOutcome::Confirmed(hash))
    }

    /// Wrap (`is_wrap`) or unwrap `value`, then refresh the balances once
    /// the read provider has had time to catch up.
    pub async fn change_wrap<S: Signer + ?Sized>(
        &self,
        connection: Option<&S>,
        is_wrap: bool,
        value: &str,
        address: &Address,
        network: Network,
    ) -> ClientResult<TxOutcome> {
        let signer = match connection {
            Some(signer) => signer,
            None => {
                self.notifier.warning(messages::PLEASE_CONNECT_WALLET);
                return Ok(TxOutcome::WalletNotConnected);
            }
        };
        let direction = WrapDirection::from_is_wrap(is_wrap);
        let wskandy = WrappedToken::new(required(self.addresses(network).wskandy, "wsKANDY")?);
        let amount = parse_units(value, direction.input_decimals())?;

        let sent = self
            .send_and_confirm(
                signer,
                direction.pending_text(),
                direction.pending_kind(),
                |from, gas| match direction {
                    WrapDirection::Wrap => wskandy.wrap(from, amount, gas),
                    WrapDirection::Unwrap => wskandy.unwrap(from, amount, gas),
                },
            )
            .await;
        let hash = match sent {
            Ok(hash) => hash,
            Err(text) => return Ok(TxOutcome::Failed(text)),
        };

        self.notifier.info(messages::YOUR_BALANCE_UPDATE_SOON);
        tokio::time::sleep(self.policy.balance_delay).await;
        self.get_balances(address, network, signer).await?;
        self.notifier.info(messages::YOUR_BALANCE_UPDATED);
        Ok(TxOutcome::Confirmed(hash))
    }

    /// Preview what `value` converts to in the other denomination and commit
    /// it as the wrap value. An absent or blank amount clears the preview
    /// without calling the contract.
    pub async fn calc_wrap_details<P: Provider + ?Sized>(
        &self,
        connection: Option<&P>,
        is_wrap: bool,
        value: Option<&str>,
        network: Network,
    ) -> ClientResult<Option<DisplayAmount>> {
        self.set_wrap(Some(true), None);
        let provider = match connection {
            Some(provider) => provider,
            None => {
                self.notifier.warning(messages::PLEASE_CONNECT_WALLET);
                self.set_wrap(Some(false), None);
                return Ok(None);
            }
        };
        let value = match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => {
                self.set_wrap(Some(false), Some(None));
                return Ok(None);
            }
        };

        match self.convert(provider, WrapDirection::from_is_wrap(is_wrap), value, network).await {
            Ok(converted) => {
                self.set_wrap(Some(false), Some(Some(converted.clone())));
                Ok(Some(converted))
            }
            Err(e) => {
                error!("Calculating wrap details failed: {}", e);
                self.set_wrap(Some(false), None);
                Err(e)
            }
        }
    }

    async fn convert<P: Provider + ?Sized>(
        &self,
        provider: &P,
        direction: WrapDirection,
        value: &str,
        network: Network,
    ) -> ClientResult<DisplayAmount> {
        let wskandy = WrappedToken::new(required(self.addresses(network).wskandy, "wsKANDY")?);
        let amount = parse_units(value, direction.input_decimals())?;
        let converted = match direction {
            WrapDirection::Wrap => wskandy.skandy_to_wskandy(provider, amount).await?,
            WrapDirection::Unwrap => wskandy.wskandy_to_skandy(provider, amount).await?,
        };
        Ok(DisplayAmount::from_raw(&converted, direction.output_decimals()))
    }

    fn set_wrap(&self, loading: Option<bool>, wrap_value: Option<Option<DisplayAmount>>) {
        self.store.apply(Patch::Wrap(WrapPatch {
            loading,
            wrap_value,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_exponents_are_inverse() {
        let wrap = WrapDirection::from_is_wrap(true);
        let unwrap = WrapDirection::from_is_wrap(false);
        assert_eq!(wrap.input_decimals(), 9);
        assert_eq!(wrap.output_decimals(), 18);
        assert_eq!(unwrap.input_decimals(), unwrap.output_decimals() + 9);
        assert_eq!(wrap.pending_kind().to_string(), "wrapping");
        assert_eq!(unwrap.pending_text(), "Unwrapping");
    }
}
