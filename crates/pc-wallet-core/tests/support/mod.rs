use async_trait::async_trait;
use pc_wallet_client::{
    AccountsHandler, AddressStore, InMemoryStore, ListenerId, ProviderError, RpcRequest,
    StorageError, WalletClient, WalletProvider,
};
use pc_wallet_core::ConnectionController;
use pc_wallet_types::WalletAddress;
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::oneshot;

pub type Reply = Result<Value, ProviderError>;

enum Scripted {
    Ready(Reply),
    Pending(oneshot::Receiver<Reply>),
}

/// In-process provider whose replies are queued by the test.
pub struct FakeProvider {
    metamask: bool,
    events: bool,
    replies: RefCell<VecDeque<Scripted>>,
    listeners: RefCell<Vec<(ListenerId, AccountsHandler)>>,
    next_listener: Cell<u64>,
    requests: Cell<usize>,
}

impl FakeProvider {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            metamask: true,
            events: true,
            replies: RefCell::new(VecDeque::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            requests: Cell::new(0),
        })
    }

    pub fn without_events() -> Rc<Self> {
        Rc::new(Self {
            metamask: true,
            events: false,
            replies: RefCell::new(VecDeque::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            requests: Cell::new(0),
        })
    }

    pub fn grant(&self, accounts: &[&str]) {
        self.reply(Ok(json!(accounts)));
    }

    pub fn reply(&self, reply: Reply) {
        self.replies.borrow_mut().push_back(Scripted::Ready(reply));
    }

    /// Queues a reply the test resolves later through the returned sender.
    pub fn pending(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.borrow_mut().push_back(Scripted::Pending(rx));
        tx
    }

    pub fn emit_accounts(&self, accounts: &[&str]) {
        let handlers: Vec<AccountsHandler> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(accounts.iter().map(|a| WalletAddress::from(*a)).collect());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn request_count(&self) -> usize {
        self.requests.get()
    }
}

#[async_trait(?Send)]
impl WalletProvider for FakeProvider {
    fn is_metamask(&self) -> bool {
        self.metamask
    }

    async fn request(&self, request: RpcRequest) -> Reply {
        assert_eq!(request.method, pc_wallet_client::REQUEST_ACCOUNTS);
        self.requests.set(self.requests.get() + 1);

        let scripted = self.replies.borrow_mut().pop_front();
        match scripted {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Pending(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ProviderError::new(None, "reply dropped"))),
            None => Err(ProviderError::new(None, "no scripted reply")),
        }
    }

    fn subscribe_accounts(&self, handler: AccountsHandler) -> Option<ListenerId> {
        if !self.events {
            return None;
        }
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, handler));
        Some(id)
    }

    fn unsubscribe_accounts(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(existing, _)| *existing != id);
    }
}

/// Store that fails every operation, like disabled browser storage.
pub struct BrokenStore;

impl AddressStore for BrokenStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Operation("quota exceeded".to_owned()))
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

pub fn handle(provider: &Rc<FakeProvider>) -> Option<Rc<dyn WalletProvider>> {
    Some(provider.clone() as Rc<dyn WalletProvider>)
}

pub fn controller(
    provider: &Rc<FakeProvider>,
    store: &Rc<InMemoryStore>,
) -> ConnectionController<Rc<InMemoryStore>> {
    ConnectionController::new(WalletClient::new(handle(provider), store.clone()))
}
