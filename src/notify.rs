//! User-facing notices and the wallet error classifier.

use crate::errors::ProviderError;
use serde_json::Value;
use tokio::sync::mpsc;

/// Fixed texts shown to the user.
pub mod messages {
    pub const PLEASE_CONNECT_WALLET: &str = "Please connect your wallet!";
    pub const TX_SUCCESSFULLY_SEND: &str = "Your transaction was successfully sent";
    pub const YOUR_BALANCE_UPDATE_SOON: &str = "Your balance will update soon";
    pub const YOUR_BALANCE_UPDATED: &str = "Your balance was successfully updated";
    pub const SOMETHING_WRONG: &str = "Something went wrong";
    pub const BOND_MORE_THAN_BALANCE: &str = "You may be trying to bond more than your balance! \
                                              Error code: 32603. Message: ds-math-sub-underflow";
    pub const INSUFFICIENT_BALANCE: &str = "Insufficient balance to make a transaction";
    pub const TRANSACTION_CANCELLED: &str = "Your transaction was cancelled";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub text:     String,
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}] {}", tag, self.text)
    }
}

/// Sending half of the notification channel. Every notice is also logged.
/// A dropped receiver only disables delivery; it never fails the sender.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<Notification>,
}

/// Create a notifier and the stream a UI collaborator reads from.
pub fn channel() -> (Notifier, mpsc::UnboundedReceiver<Notification>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        Notifier {
            sender,
        },
        receiver,
    )
}

impl Notifier {
    pub fn notify(&self, severity: Severity, text: impl Into<String>) {
        let text = text.into();
        match severity {
            Severity::Info | Severity::Success => info!("{}", text),
            Severity::Warning => warn!("{}", text),
            Severity::Error => error!("{}", text),
        }
        if self
            .sender
            .send(Notification {
                severity,
                text,
            })
            .is_err()
        {
            trace!("Notification receiver is gone, dropping notice");
        }
    }

    pub fn info(&self, text: impl Into<String>) { self.notify(Severity::Info, text) }

    pub fn success(&self, text: impl Into<String>) { self.notify(Severity::Success, text) }

    pub fn warning(&self, text: impl Into<String>) { self.notify(Severity::Warning, text) }

    pub fn error(&self, text: impl Into<String>) { self.notify(Severity::Error, text) }
}

/// Map a wallet or node failure to the text shown to the user.
pub fn wallet_error_message(err: &ProviderError) -> String {
    let mut text = messages::SOMETHING_WRONG.to_owned();
    if let ProviderError::Rpc {
        code,
        message,
        data,
    } = err
    {
        if *code == -32603 {
            if message.contains("ds-math-sub-underflow") {
                text = messages::BOND_MORE_THAN_BALANCE.to_owned();
            }
            let data_message = data.as_ref().and_then(|d| d.get("message")).and_then(Value::as_str);
            if let Some(data_message) = data_message {
                text = match data_message.split_once(':') {
                    Some((_, rest)) => rest.split(':').next().unwrap_or(rest).trim().to_owned(),
                    None => data
                        .as_ref()
                        .and_then(|d| d.get("data"))
                        .and_then(Value::as_str)
                        .unwrap_or(data_message)
                        .to_owned(),
                };
                if data_message.contains("gas required exceeds allowance") {
                    text = messages::INSUFFICIENT_BALANCE.to_owned();
                }
            }
        }
        if *code == 4001 && message.contains("User denied transaction signature") {
            text = messages::TRANSACTION_CANCELLED.to_owned();
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rpc(code: i64, message: &str, data: Option<Value>) -> ProviderError {
        ProviderError::Rpc {
            code,
            message: message.to_owned(),
            data,
        }
    }

    #[test]
    fn default_text_for_unknown_shapes() {
        assert_eq!(wallet_error_message(&ProviderError::NoSigner), messages::SOMETHING_WRONG);
        assert_eq!(wallet_error_message(&rpc(-32000, "nonce too low", None)), messages::SOMETHING_WRONG);
    }

    #[test]
    fn user_rejection() {
        let err = rpc(4001, "MetaMask Tx Signature: User denied transaction signature.", None);
        assert_eq!(wallet_error_message(&err), messages::TRANSACTION_CANCELLED);
    }

    #[test]
    fn internal_error_shapes() {
        let underflow = rpc(-32603, "execution reverted: ds-math-sub-underflow", None);
        assert_eq!(wallet_error_message(&underflow), messages::BOND_MORE_THAN_BALANCE);

        let revert = rpc(
            -32603,
            "Internal JSON-RPC error.",
            Some(json!({ "message": "execution reverted: Bond too small", "code": 3 })),
        );
        assert_eq!(wallet_error_message(&revert), "Bond too small");

        let bare = rpc(-32603, "Internal", Some(json!({ "message": "reverted", "data": "0x08c379a0" })));
        assert_eq!(wallet_error_message(&bare), "0x08c379a0");

        let no_gas = rpc(
            -32603,
            "Internal",
            Some(json!({ "message": "err: gas required exceeds allowance (8000000)" })),
        );
        assert_eq!(wallet_error_message(&no_gas), messages::INSUFFICIENT_BALANCE);
    }

    #[tokio::test]
    async fn notices_reach_the_receiver() {
        let (notifier, mut rx) = channel();
        notifier.success(messages::TX_SUCCESSFULLY_SEND);
        notifier.warning("careful");
        assert_eq!(
            rx.recv().await,
            Some(Notification {
                severity: Severity::Success,
                text:     messages::TX_SUCCESSFULLY_SEND.to_owned(),
            })
        );
        assert_eq!(rx.recv().await.map(|n| n.severity), Some(Severity::Warning));
        drop(rx);
        notifier.info("nobody listens");
    }

    #[tokio::test]
    async fn queued_notices_outlive_the_notifier() {
        let (notifier, mut rx) = channel();
        notifier.error(messages::TRANSACTION_CANCELLED);
        drop(notifier);
        let mut printed = Vec::new();
        while let Some(notice) = rx.recv().await {
            printed.push(notice.to_string());
        }
        assert_eq!(printed, vec!["[error] Your transaction was cancelled".to_owned()]);
    }
}
