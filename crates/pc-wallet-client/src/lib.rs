mod provider;
mod store;

pub use provider::{
    ACCOUNTS_CHANGED, AccountsHandler, AccountsSubscription, ErrorCode, ListenerId,
    NO_PROVIDER_CODE, ProviderError, REQUEST_ACCOUNTS, RpcRequest, USER_REJECTED_CODE,
    WalletProvider,
};
pub use store::{AddressStore, InMemoryStore, NoopStore, StorageError};

use pc_wallet_types::{DEFAULT_STORAGE_KEY, WalletAddress};
use std::rc::Rc;
use tracing::warn;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("NO_PROVIDER")]
    NoProvider,
    #[error("NO_ACCOUNTS")]
    NoAccounts,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl WalletError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::NoProvider => Some(ErrorCode::Text(NO_PROVIDER_CODE.to_owned())),
            Self::NoAccounts => None,
            Self::Provider(err) => err.code.clone(),
        }
    }
}

/// Talks to the injected provider and the persistence substrate. Holds only
/// the handles it was given.
pub struct WalletClient<S> {
    provider: Option<Rc<dyn WalletProvider>>,
    store: S,
    storage_key: String,
}

impl<S> WalletClient<S>
where
    S: AddressStore,
{
    pub fn new(provider: Option<Rc<dyn WalletProvider>>, store: S) -> Self {
        Self::with_storage_key(provider, store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_storage_key(
        provider: Option<Rc<dyn WalletProvider>>,
        store: S,
        storage_key: &str,
    ) -> Self {
        Self {
            provider,
            store,
            storage_key: storage_key.to_owned(),
        }
    }

    pub fn provider(&self) -> Option<Rc<dyn WalletProvider>> {
        self.provider.clone()
    }

    pub fn is_provider_available(&self) -> bool {
        let Some(provider) = &self.provider else {
            return false;
        };
        provider.is_metamask() || provider.providers().iter().any(|p| p.is_metamask())
    }

    /// Prompts the provider for account access and returns the first granted
    /// account. Provider failures are passed through untouched.
    pub async fn request_accounts(&self) -> Result<WalletAddress, WalletError> {
        let Some(provider) = &self.provider else {
            return Err(WalletError::NoProvider);
        };

        let granted = provider.request(RpcRequest::new(REQUEST_ACCOUNTS)).await?;
        let accounts: Vec<String> =
            serde_json::from_value(granted).map_err(|_| WalletError::NoAccounts)?;

        accounts
            .into_iter()
            .next()
            .map(WalletAddress)
            .ok_or(WalletError::NoAccounts)
    }

    pub fn persist(&self, address: &WalletAddress) {
        if let Err(err) = self.store.set_item(&self.storage_key, address.as_str()) {
            warn!("failed to save wallet address: {}", err);
        }
    }

    pub fn load_persisted(&self) -> Option<WalletAddress> {
        match self.store.get_item(&self.storage_key) {
            Ok(value) => value.filter(|v| !v.is_empty()).map(WalletAddress),
            Err(err) => {
                warn!("failed to load wallet address: {}", err);
                None
            }
        }
    }

    pub fn clear_persisted(&self) {
        if let Err(err) = self.store.remove_item(&self.storage_key) {
            warn!("failed to clear wallet address: {}", err);
        }
    }
}

/// Shortens an address for display: `0x1234...cdef`.
///
/// Works on characters, so it never splits a multi-byte sequence. Addresses
/// too short to shorten come back unchanged, as does everything when
/// `visible_chars` is zero.
pub fn truncate(address: &str, visible_chars: usize) -> String {
    if address.is_empty() || visible_chars == 0 {
        return address.to_owned();
    }

    let (prefix, body) = match address.strip_prefix("0x") {
        Some(rest) => ("0x", rest),
        None => ("", address),
    };

    let chars: Vec<char> = body.chars().collect();
    if chars.len() <= visible_chars.saturating_mul(2) {
        return address.to_owned();
    }

    let start: String = chars[..visible_chars].iter().collect();
    let end: String = chars[chars.len() - visible_chars..].iter().collect();
    format!("{prefix}{start}...{end}")
}
