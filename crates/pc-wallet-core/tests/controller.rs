mod support;

use pc_wallet_client::{
    AddressStore, ErrorCode, InMemoryStore, ProviderError, WalletClient,
};
use pc_wallet_core::{ConnectionController, ConnectionError};
use pc_wallet_types::{ConnectionStatus, DEFAULT_STORAGE_KEY, WalletAddress, WalletView};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use support::{BrokenStore, FakeProvider, controller, handle};

fn persisted(store: &InMemoryStore) -> anyhow::Result<Option<String>> {
    Ok(store.get_item(DEFAULT_STORAGE_KEY)?)
}

#[tokio::test]
async fn connect_without_provider_reports_not_installed() -> anyhow::Result<()> {
    let store = Rc::new(InMemoryStore::default());
    let controller = ConnectionController::new(WalletClient::new(None, store.clone()));

    assert!(!controller.is_provider_available());
    assert!(!controller.is_subscribed());

    controller.connect().await;

    assert_eq!(controller.status(), ConnectionStatus::Error);
    assert_eq!(controller.error(), Some(ConnectionError::NotInstalled));
    assert_eq!(
        controller.view().error.as_deref(),
        Some("MetaMask is not installed. Please install it to continue.")
    );
    assert_eq!(controller.address(), None);
    assert_eq!(persisted(&store)?, None);
    Ok(())
}

#[tokio::test]
async fn connect_uses_first_granted_account() -> anyhow::Result<()> {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);
    provider.grant(&["0xABC123", "0xDEF456"]);

    controller.connect().await;

    assert!(controller.is_connected());
    assert_eq!(controller.address(), Some(WalletAddress::from("0xABC123")));
    assert_eq!(controller.error(), None);
    assert_eq!(persisted(&store)?.as_deref(), Some("0xABC123"));
    Ok(())
}

#[tokio::test]
async fn user_rejection_is_classified_and_not_persisted() -> anyhow::Result<()> {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);
    provider.reply(Err(ProviderError::user_rejected()));

    controller.connect().await;

    assert_eq!(controller.status(), ConnectionStatus::Error);
    assert_eq!(controller.error(), Some(ConnectionError::Rejected));
    assert_eq!(
        controller.view().error.as_deref(),
        Some("Connection request was rejected.")
    );
    assert_eq!(controller.address(), None);
    assert_eq!(persisted(&store)?, None);
    Ok(())
}

#[tokio::test]
async fn empty_grant_and_unknown_failures_are_generic() {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);

    provider.grant(&[]);
    controller.connect().await;
    assert_eq!(controller.error(), Some(ConnectionError::Failed));

    provider.reply(Err(ProviderError::new(
        Some(ErrorCode::Numeric(-32603)),
        "internal error",
    )));
    controller.connect().await;
    assert_eq!(controller.error(), Some(ConnectionError::Failed));
    assert_eq!(
        controller.view().error.as_deref(),
        Some("Failed to connect to MetaMask.")
    );
}

#[tokio::test]
async fn connect_recovers_from_error() {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);

    provider.reply(Err(ProviderError::user_rejected()));
    controller.connect().await;
    assert_eq!(controller.status(), ConnectionStatus::Error);

    provider.grant(&["0xABC123"]);
    controller.connect().await;
    assert!(controller.is_connected());
    assert_eq!(controller.error(), None);
}

#[tokio::test]
async fn disconnect_clears_state_and_storage_from_any_state() -> anyhow::Result<()> {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);

    provider.grant(&["0xABC123"]);
    controller.connect().await;
    controller.disconnect();
    assert_eq!(controller.status(), ConnectionStatus::Idle);
    assert_eq!(controller.address(), None);
    assert_eq!(persisted(&store)?, None);

    provider.reply(Err(ProviderError::user_rejected()));
    controller.connect().await;
    controller.disconnect();
    assert_eq!(controller.status(), ConnectionStatus::Idle);
    assert_eq!(controller.error(), None);

    // Local sign-out only: the listener stays registered.
    assert_eq!(provider.listener_count(), 1);
    Ok(())
}

#[tokio::test]
async fn empty_account_change_returns_to_idle() -> anyhow::Result<()> {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);

    provider.grant(&["0xABC123"]);
    controller.connect().await;
    provider.emit_accounts(&[]);

    assert_eq!(controller.status(), ConnectionStatus::Idle);
    assert_eq!(controller.address(), None);
    assert_eq!(persisted(&store)?, None);
    Ok(())
}

#[tokio::test]
async fn account_change_connects_from_error() -> anyhow::Result<()> {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);

    provider.reply(Err(ProviderError::user_rejected()));
    controller.connect().await;
    provider.emit_accounts(&["0x999AAA", "0x888BBB"]);

    assert!(controller.is_connected());
    assert_eq!(controller.address(), Some(WalletAddress::from("0x999AAA")));
    assert_eq!(controller.error(), None);
    assert_eq!(persisted(&store)?.as_deref(), Some("0x999AAA"));
    Ok(())
}

#[test]
fn account_change_connects_from_idle_without_request() {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);

    provider.emit_accounts(&["0x777CCC"]);

    assert!(controller.is_connected());
    assert_eq!(controller.address(), Some(WalletAddress::from("0x777CCC")));
    assert_eq!(provider.request_count(), 0);
}

#[test]
fn restart_restores_persisted_address_without_provider_contact() {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::with_item(DEFAULT_STORAGE_KEY, "0xABC123"));

    let controller = controller(&provider, &store);

    assert!(controller.is_connected());
    assert_eq!(controller.address(), Some(WalletAddress::from("0xABC123")));
    assert_eq!(provider.request_count(), 0);
}

#[test]
fn restart_without_persisted_address_is_idle() {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);
    assert_eq!(controller.view(), WalletView::default());
}

#[tokio::test]
async fn account_change_during_connect_wins() -> anyhow::Result<()> {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);
    let reply = provider.pending();

    tokio::join!(controller.connect(), async {
        assert_eq!(controller.status(), ConnectionStatus::Connecting);
        provider.emit_accounts(&["0xNEW111"]);
        let _ = reply.send(Ok(json!(["0xOLD222"])));
    });

    assert_eq!(controller.address(), Some(WalletAddress::from("0xNEW111")));
    assert_eq!(persisted(&store)?.as_deref(), Some("0xNEW111"));
    Ok(())
}

#[tokio::test]
async fn disconnect_during_connect_discards_late_grant() -> anyhow::Result<()> {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);
    let reply = provider.pending();

    tokio::join!(controller.connect(), async {
        controller.disconnect();
        let _ = reply.send(Ok(json!(["0xLATE333"])));
    });

    assert_eq!(controller.status(), ConnectionStatus::Idle);
    assert_eq!(persisted(&store)?, None);
    Ok(())
}

#[tokio::test]
async fn newer_connect_supersedes_older_one() -> anyhow::Result<()> {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);
    let first = provider.pending();
    let second = provider.pending();

    tokio::join!(controller.connect(), controller.connect(), async {
        let _ = first.send(Ok(json!(["0xFIRST1"])));
        let _ = second.send(Err(ProviderError::user_rejected()));
    });

    assert_eq!(controller.error(), Some(ConnectionError::Rejected));
    assert_eq!(persisted(&store)?, None);
    assert_eq!(provider.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn observers_see_every_transition() {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = controller(&provider, &store);
    let seen: Rc<RefCell<Vec<ConnectionStatus>>> = Rc::default();

    let sink = seen.clone();
    let id = controller.on_change(move |view| sink.borrow_mut().push(view.status));

    provider.grant(&["0xABC123"]);
    controller.connect().await;
    provider.emit_accounts(&[]);

    assert_eq!(
        *seen.borrow(),
        vec![
            ConnectionStatus::Connecting,
            ConnectionStatus::Connected,
            ConnectionStatus::Idle,
        ]
    );

    assert!(controller.remove_observer(id));
    controller.disconnect();
    assert_eq!(seen.borrow().len(), 3);
}

#[tokio::test]
async fn observer_can_reenter_controller() {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());
    let controller = Rc::new(controller(&provider, &store));

    let weak = Rc::downgrade(&controller);
    controller.on_change(move |view| {
        if view.status == ConnectionStatus::Error {
            if let Some(controller) = weak.upgrade() {
                controller.disconnect();
            }
        }
    });

    provider.reply(Err(ProviderError::user_rejected()));
    controller.connect().await;
    assert_eq!(controller.status(), ConnectionStatus::Idle);
}

#[test]
fn listener_is_released_on_shutdown_and_drop() {
    let provider = FakeProvider::new();
    let store = Rc::new(InMemoryStore::default());

    let controller = controller(&provider, &store);
    assert!(controller.is_subscribed());
    assert_eq!(provider.listener_count(), 1);
    controller.shutdown();
    assert!(!controller.is_subscribed());
    assert_eq!(provider.listener_count(), 0);
    controller.shutdown();

    let controller = support::controller(&provider, &store);
    assert_eq!(provider.listener_count(), 1);
    drop(controller);
    assert_eq!(provider.listener_count(), 0);
}

#[test]
fn provider_without_events_is_tolerated() {
    let provider = FakeProvider::without_events();
    let store = Rc::new(InMemoryStore::default());
    let controller = ConnectionController::new(WalletClient::new(handle(&provider), store));

    assert!(controller.is_provider_available());
    assert!(!controller.is_subscribed());
    controller.shutdown();
}

#[tokio::test]
async fn storage_failures_do_not_block_connection() {
    let provider = FakeProvider::new();
    let controller = ConnectionController::new(WalletClient::new(handle(&provider), BrokenStore));
    assert_eq!(controller.status(), ConnectionStatus::Idle);

    provider.grant(&["0xABC123"]);
    controller.connect().await;
    assert!(controller.is_connected());

    provider.emit_accounts(&[]);
    assert_eq!(controller.status(), ConnectionStatus::Idle);
}
