//! Connection state machine.
//!
//! States: `idle` → `connecting` → `connected` | `error`, with `disconnect`
//! and provider-pushed account changes able to jump from any state.
//!
//! Each `connect()` runs under an attempt number. Its outcome is applied only
//! while the state is still `Connecting` with that attempt; a disconnect, an
//! account change or a newer connect in the meantime supersedes it.

use crate::ConnectionError;
use pc_wallet_client::{AccountsHandler, AccountsSubscription, AddressStore, WalletClient, WalletError};
use pc_wallet_types::{ConnectionStatus, WalletAddress, WalletView};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting { attempt: u64 },
    Connected { address: WalletAddress },
    Error { error: ConnectionError },
}

impl ConnectionState {
    pub fn status(&self) -> ConnectionStatus {
        match self {
            Self::Idle => ConnectionStatus::Idle,
            Self::Connecting { .. } => ConnectionStatus::Connecting,
            Self::Connected { .. } => ConnectionStatus::Connected,
            Self::Error { .. } => ConnectionStatus::Error,
        }
    }

    fn view(&self) -> WalletView {
        let (address, error) = match self {
            Self::Connected { address } => (Some(address.0.clone()), None),
            Self::Error { error } => (None, Some(error.to_string())),
            Self::Idle | Self::Connecting { .. } => (None, None),
        };
        WalletView {
            connected: address.is_some(),
            address,
            status: self.status(),
            error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Rc<dyn Fn(&WalletView)>;

struct Inner<S> {
    client: WalletClient<S>,
    state: RefCell<ConnectionState>,
    last_attempt: Cell<u64>,
    observers: RefCell<Vec<(ObserverId, Observer)>>,
    next_observer: Cell<u64>,
}

impl<S> Inner<S>
where
    S: AddressStore,
{
    fn transition(&self, next: ConnectionState) {
        let view = next.view();
        *self.state.borrow_mut() = next;

        // Observers may call back into the controller.
        let observers: Vec<Observer> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer(&view);
        }
    }

    fn begin_attempt(&self) -> u64 {
        let attempt = self.last_attempt.get() + 1;
        self.last_attempt.set(attempt);
        self.transition(ConnectionState::Connecting { attempt });
        attempt
    }

    fn finish_attempt(&self, attempt: u64, outcome: Result<WalletAddress, WalletError>) {
        let current = matches!(
            *self.state.borrow(),
            ConnectionState::Connecting { attempt: active } if active == attempt
        );
        if !current {
            debug!("discarding superseded connect attempt {}", attempt);
            return;
        }

        match outcome {
            Ok(address) => {
                info!("wallet connected: {}", address);
                self.client.persist(&address);
                self.transition(ConnectionState::Connected { address });
            }
            Err(err) => {
                let error = ConnectionError::classify(&err);
                warn!("wallet connect failed: {}", err);
                self.transition(ConnectionState::Error { error });
            }
        }
    }

    fn accounts_changed(&self, accounts: Vec<WalletAddress>) {
        match accounts.into_iter().next() {
            Some(address) => {
                info!("provider switched account: {}", address);
                self.client.persist(&address);
                self.transition(ConnectionState::Connected { address });
            }
            None => {
                info!("provider revoked account access");
                self.client.clear_persisted();
                self.transition(ConnectionState::Idle);
            }
        }
    }
}

/// Single owner of the wallet connection state.
pub struct ConnectionController<S> {
    inner: Rc<Inner<S>>,
    subscription: RefCell<Option<AccountsSubscription>>,
}

impl<S> ConnectionController<S>
where
    S: AddressStore + 'static,
{
    /// Restores the persisted address without contacting the provider, then
    /// subscribes to account changes when the provider supports it.
    pub fn new(client: WalletClient<S>) -> Self {
        let initial = match client.load_persisted() {
            Some(address) => ConnectionState::Connected { address },
            None => ConnectionState::Idle,
        };
        let provider = client.provider();

        let inner = Rc::new(Inner {
            client,
            state: RefCell::new(initial),
            last_attempt: Cell::new(0),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(0),
        });

        let subscription = provider.and_then(|provider| {
            let weak = Rc::downgrade(&inner);
            let handler: AccountsHandler = Rc::new(move |accounts| {
                if let Some(inner) = weak.upgrade() {
                    inner.accounts_changed(accounts);
                }
            });
            AccountsSubscription::register(provider, handler)
        });
        if subscription.is_none() {
            debug!("no account-change subscription available");
        }

        Self {
            inner,
            subscription: RefCell::new(subscription),
        }
    }

    pub async fn connect(&self) {
        let attempt = self.inner.begin_attempt();
        let outcome = self.inner.client.request_accounts().await;
        self.inner.finish_attempt(attempt, outcome);
    }

    /// Local sign-out. The provider keeps its authorization grant.
    pub fn disconnect(&self) {
        info!("wallet disconnected");
        self.inner.client.clear_persisted();
        self.inner.transition(ConnectionState::Idle);
    }

    /// Applies an account-change notification. Normally driven by the
    /// provider subscription.
    pub fn apply_accounts_changed(&self, accounts: Vec<WalletAddress>) {
        self.inner.accounts_changed(accounts);
    }

    /// Deregisters the account-change listener. Also happens on drop.
    pub fn shutdown(&self) {
        if let Some(mut subscription) = self.subscription.borrow_mut().take() {
            subscription.release();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .borrow()
            .as_ref()
            .is_some_and(AccountsSubscription::is_active)
    }

    pub fn is_provider_available(&self) -> bool {
        self.inner.client.is_provider_available()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.state.borrow().status()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    pub fn address(&self) -> Option<WalletAddress> {
        match &*self.inner.state.borrow() {
            ConnectionState::Connected { address } => Some(address.clone()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<ConnectionError> {
        match &*self.inner.state.borrow() {
            ConnectionState::Error { error } => Some(*error),
            _ => None,
        }
    }

    pub fn view(&self) -> WalletView {
        self.inner.state.borrow().view()
    }

    pub fn on_change(&self, observer: impl Fn(&WalletView) + 'static) -> ObserverId {
        let id = ObserverId(self.inner.next_observer.get());
        self.inner.next_observer.set(id.0 + 1);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Rc::new(observer)));
        id
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.inner.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }
}
