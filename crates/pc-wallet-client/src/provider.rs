use async_trait::async_trait;
use pc_wallet_types::WalletAddress;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ACCOUNTS_CHANGED: &str = "accountsChanged";

/// Reserved code a provider uses when the user dismisses its prompt.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Sentinel attached to failures caused by a missing provider.
pub const NO_PROVIDER_CODE: &str = "NO_PROVIDER";

/// `{ method, params? }` request object understood by injected providers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_owned(),
            params: None,
        }
    }
}

/// Providers report codes as numbers (`4001`) or strings (`"NO_PROVIDER"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ErrorCode {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(code) => write!(f, "{code}"),
            Self::Text(code) => f.write_str(code),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("provider error{}: {message}", .code.as_ref().map(|c| format!(" {c}")).unwrap_or_default())]
pub struct ProviderError {
    pub code: Option<ErrorCode>,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: Option<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(
            Some(ErrorCode::Numeric(USER_REJECTED_CODE)),
            "User rejected the request.",
        )
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(ErrorCode::Numeric(USER_REJECTED_CODE))
    }

    pub fn is_no_provider(&self) -> bool {
        matches!(&self.code, Some(ErrorCode::Text(code)) if code == NO_PROVIDER_CODE)
            || self.message == NO_PROVIDER_CODE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub type AccountsHandler = Rc<dyn Fn(Vec<WalletAddress>)>;

/// Injected wallet provider. Browser handles are single-threaded, so the
/// futures here are not `Send`.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Self-identification flag (`isMetaMask`).
    fn is_metamask(&self) -> bool;

    /// Nested providers when several wallets share the injection slot.
    fn providers(&self) -> Vec<Rc<dyn WalletProvider>> {
        Vec::new()
    }

    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError>;

    /// Returns `None` when the provider exposes no event subscription.
    fn subscribe_accounts(&self, _handler: AccountsHandler) -> Option<ListenerId> {
        None
    }

    fn unsubscribe_accounts(&self, _id: ListenerId) {}
}

/// Registered `accountsChanged` listener. Deregisters when released or dropped.
pub struct AccountsSubscription {
    provider: Rc<dyn WalletProvider>,
    id: Option<ListenerId>,
}

impl AccountsSubscription {
    pub fn register(provider: Rc<dyn WalletProvider>, handler: AccountsHandler) -> Option<Self> {
        let id = provider.subscribe_accounts(handler)?;
        Some(Self {
            provider,
            id: Some(id),
        })
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.provider.unsubscribe_accounts(id);
        }
    }
}

impl Drop for AccountsSubscription {
    fn drop(&mut self) {
        self.release();
    }
}
