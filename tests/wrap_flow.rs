use kandy_client::{
    abi::{self, max_uint256, Token},
    dashboard::{Dashboard, RefreshPolicy},
    errors::ClientError,
    network::{AddressBook, Network, NetworkAddresses},
    notify::{self, messages, Notification, Severity},
    primitives::Address,
    store::{PendingTxnKind, Store},
    wrap::TxOutcome,
};
use provider_stub::{uint, ProviderStub};
use tokio::sync::mpsc::UnboundedReceiver;


const USER: Address = Address([0xcc; 20]);
const KANDY: Address = Address([1; 20]);
const SKANDY: Address = Address([2; 20]);
const WSKANDY: Address = Address([3; 20]);

fn setup() -> (Dashboard, UnboundedReceiver<Notification>) {
    let mut book = AddressBook::default();
    book.insert(Network::Avax, NetworkAddresses {
        kandy: Some(KANDY),
        skandy: Some(SKANDY),
        wskandy: Some(WSKANDY),
        ..Default::default()
    });
    let (notifier, notices) = notify::channel();
    (Dashboard::new(Store::default(), notifier, book, RefreshPolicy::immediate()), notices)
}

fn drain(notices: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        out.push(notice);
    }
    out
}

fn notice(severity: Severity, text: &str) -> Notification {
    Notification {
        severity,
        text: text.to_owned(),
    }
}

/// Without a wallet the user is asked to connect and nothing is sent.
#[tokio::test]
async fn test_no_wallet() {
    let (dashboard, mut notices) = setup();

    let outcome = dashboard
        .change_wrap(None::<&ProviderStub>, true, "1", &USER, Network::Avax)
        .await
        .expect("outcome");

    assert_eq!(outcome, TxOutcome::WalletNotConnected);
    assert_eq!(drain(&mut notices), vec![notice(Severity::Warning, messages::PLEASE_CONNECT_WALLET)]);
}

/// Approval sends an unlimited approve and reads the allowance back.
#[tokio::test]
async fn test_approval() {
    let mut stub = ProviderStub::with_signer(USER);
    stub.set_call_after_send(
        SKANDY,
        "allowance(address,address)",
        &[Token::Address(USER), Token::Address(WSKANDY)],
        &[max_uint256()],
    );
    let (dashboard, mut notices) = setup();

    let outcome =
        dashboard.change_approval(Some(&stub), &USER, Network::Avax).await.expect("outcome");

    assert!(matches!(outcome, TxOutcome::Confirmed(_)));
    let sent = stub.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, SKANDY);
    assert_eq!(sent[0].from, USER);
    assert_eq!(
        sent[0].data,
        abi::encode_call("approve(address,uint256)", &[
            Token::Address(WSKANDY),
            Token::Uint(max_uint256())
        ])
        .expect("encode")
    );
    assert_eq!(sent[0].gas_price, Some(uint(25_000_000_000)));

    let state = dashboard.store().state();
    assert!(state.pending_txns.is_empty());
    assert!(!state.account.wrapping.skandy.is_zero());
    assert_eq!(drain(&mut notices), vec![notice(Severity::Success, messages::TX_SUCCESSFULLY_SEND)]);
}

/// A rejected approval is classified and leaves no pending transaction.
#[tokio::test]
async fn test_approval_rejected() {
    let mut stub = ProviderStub::with_signer(USER);
    stub.fail_sends(4001, "MetaMask Tx Signature: User denied transaction signature.", None);
    let (dashboard, mut notices) = setup();

    let outcome =
        dashboard.change_approval(Some(&stub), &USER, Network::Avax).await.expect("outcome");

    assert_eq!(outcome, TxOutcome::Failed(messages::TRANSACTION_CANCELLED.to_owned()));
    let state = dashboard.store().state();
    assert!(state.pending_txns.is_empty());
    assert!(state.account.wrapping.skandy.is_zero());
    assert_eq!(stub.call_count(), 0);
    assert_eq!(drain(&mut notices), vec![notice(Severity::Error, messages::TRANSACTION_CANCELLED)]);
}

/// A submitted approval that reverts is removed from the pending list and
/// the allowance is not read back.
#[tokio::test]
async fn test_approval_reverted() {
    let mut stub = ProviderStub::with_signer(USER);
    stub.revert_transactions();
    let (dashboard, mut notices) = setup();
    let updates = dashboard.store().subscribe();

    let outcome =
        dashboard.change_approval(Some(&stub), &USER, Network::Avax).await.expect("outcome");

    assert_eq!(outcome, TxOutcome::Failed(messages::SOMETHING_WRONG.to_owned()));
    assert_eq!(stub.sent().len(), 1);
    assert!(updates.has_changed().expect("store alive"));
    let state = dashboard.store().state();
    assert!(state.pending_txns.is_empty());
    assert!(state.account.wrapping.skandy.is_zero());
    assert_eq!(stub.call_count(), 0);
    assert_eq!(drain(&mut notices), vec![notice(Severity::Error, messages::SOMETHING_WRONG)]);
}

/// Wrapping parses the amount at sKANDY precision and refreshes balances.
#[tokio::test]
async fn test_wrap() {
    let mut stub = ProviderStub::with_signer(USER);
    stub.set_balance(KANDY, USER, uint(0));
    stub.set_balance(SKANDY, USER, uint(10_000_000_000));
    stub.set_balance(WSKANDY, USER, uint(0));
    stub.set_call_after_send(SKANDY, "balanceOf(address)", &[Token::Address(USER)], &[uint(0)]);
    stub.set_call_after_send(WSKANDY, "balanceOf(address)", &[Token::Address(USER)], &[uint(
        500_000_000_000_000_000,
    )]);
    let (dashboard, mut notices) = setup();
    let updates = dashboard.store().subscribe();

    let outcome =
        dashboard.change_wrap(Some(&stub), true, "10", &USER, Network::Avax).await.expect("outcome");

    assert!(matches!(outcome, TxOutcome::Confirmed(_)));
    let sent = stub.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, WSKANDY);
    assert_eq!(
        sent[0].data,
        abi::encode_call("wrap(uint256)", &[Token::Uint(uint(10_000_000_000))]).expect("encode")
    );

    let state = dashboard.store().state();
    assert!(state.pending_txns.is_empty());
    assert!(!state.account.loading);
    assert!(state.account.balances.skandy.is_zero());
    assert_eq!(state.account.balances.wskandy.as_str(), "0.5");
    assert!(updates.has_changed().expect("store alive"));
    assert_eq!(drain(&mut notices), vec![
        notice(Severity::Success, messages::TX_SUCCESSFULLY_SEND),
        notice(Severity::Info, messages::YOUR_BALANCE_UPDATE_SOON),
        notice(Severity::Info, messages::YOUR_BALANCE_UPDATED),
    ]);
}

/// Unwrapping parses the amount at wsKANDY precision.
#[tokio::test]
async fn test_unwrap_amount_precision() {
    let mut stub = ProviderStub::with_signer(USER);
    for token in [KANDY, SKANDY, WSKANDY] {
        stub.set_balance(token, USER, uint(0));
    }
    let (dashboard, _notices) = setup();

    dashboard.change_wrap(Some(&stub), false, "0.5", &USER, Network::Avax).await.expect("outcome");

    assert_eq!(
        stub.sent()[0].data,
        abi::encode_call("unwrap(uint256)", &[Token::Uint(uint(500_000_000_000_000_000))])
            .expect("encode")
    );
}

/// A reverted wrap is reported and its pending entry removed.
#[tokio::test]
async fn test_wrap_reverted() {
    let mut stub = ProviderStub::with_signer(USER);
    stub.revert_transactions();
    let (dashboard, mut notices) = setup();
    let updates = dashboard.store().subscribe();

    let outcome =
        dashboard.change_wrap(Some(&stub), true, "1", &USER, Network::Avax).await.expect("outcome");

    assert_eq!(outcome, TxOutcome::Failed(messages::SOMETHING_WRONG.to_owned()));
    assert!(dashboard.store().state().pending_txns.is_empty());
    assert!(updates.has_changed().expect("store alive"));
    assert_eq!(stub.call_count(), 0);
    assert_eq!(drain(&mut notices), vec![notice(Severity::Error, messages::SOMETHING_WRONG)]);
}

/// The pending entry is visible while the transaction is awaited.
#[tokio::test]
async fn test_pending_txn_is_published() {
    let mut stub = ProviderStub::with_signer(USER);
    stub.revert_transactions();
    let (dashboard, _notices) = setup();
    let mut updates = dashboard.store().subscribe();
    let mut seen = Vec::new();

    let flow = dashboard.change_wrap(Some(&stub), true, "1", &USER, Network::Avax);
    let watch = async {
        while updates.changed().await.is_ok() {
            let txns = updates.borrow_and_update().pending_txns.clone();
            if let Some(txn) = txns.first() {
                seen.push((txn.text.clone(), txn.kind));
                break;
            }
        }
    };
    let (outcome, ()) = tokio::join!(flow, watch);

    outcome.expect("outcome");
    assert_eq!(seen, vec![("Wrapping".to_owned(), PendingTxnKind::Wrapping)]);
}

/// A malformed amount is rejected before anything is sent.
#[tokio::test]
async fn test_wrap_malformed_amount() {
    let stub = ProviderStub::with_signer(USER);
    let (dashboard, _notices) = setup();

    let result = dashboard.change_wrap(Some(&stub), true, "1.2.3", &USER, Network::Avax).await;

    assert!(matches!(result, Err(ClientError::Amount(_))));
    assert!(stub.sent().is_empty());
}

/// An empty preview clears the wrap value without calling the contract.
#[tokio::test]
async fn test_preview_empty() {
    let stub = ProviderStub::new();
    let (dashboard, _notices) = setup();

    for value in [None, Some(""), Some("  ")] {
        let preview =
            dashboard.calc_wrap_details(Some(&stub), true, value, Network::Avax).await.expect("preview");
        assert_eq!(preview, None);
    }

    let wrap = dashboard.store().state().wrap;
    assert!(!wrap.loading);
    assert_eq!(wrap.wrap_value, None);
    assert_eq!(stub.call_count(), 0);
}

/// A wrap preview sends the amount at 9 decimals and reads the result at 18.
#[tokio::test]
async fn test_preview_wrap() {
    let mut stub = ProviderStub::new();
    stub.set_call(WSKANDY, "sKANDYTowsKANDY(uint256)", &[Token::Uint(uint(1_000_000_000))], &[
        uint(250_000_000_000_000_000),
    ]);
    let (dashboard, _notices) = setup();

    let preview = dashboard
        .calc_wrap_details(Some(&stub), true, Some("1"), Network::Avax)
        .await
        .expect("preview")
        .expect("value");

    assert_eq!(preview.as_str(), "0.25");
    let wrap = dashboard.store().state().wrap;
    assert!(!wrap.loading);
    assert_eq!(wrap.wrap_value, Some(preview));
}

/// An unwrap preview sends the amount at 18 decimals and reads the result at 9.
#[tokio::test]
async fn test_preview_unwrap() {
    let mut stub = ProviderStub::new();
    stub.set_call(
        WSKANDY,
        "wsKANDYTosKANDY(uint256)",
        &[Token::Uint(uint(1_000_000_000_000_000_000))],
        &[uint(4_000_000_000)],
    );
    let (dashboard, _notices) = setup();

    let preview = dashboard
        .calc_wrap_details(Some(&stub), false, Some("1"), Network::Avax)
        .await
        .expect("preview");

    assert_eq!(preview.map(|p| p.as_str().to_owned()), Some("4.0".to_owned()));
}
