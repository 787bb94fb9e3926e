mod controller;

pub use controller::{ConnectionController, ConnectionState, ObserverId};

use pc_wallet_client::WalletError;

/// Classified connect failure. The display text is what the UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("MetaMask is not installed. Please install it to continue.")]
    NotInstalled,
    #[error("Connection request was rejected.")]
    Rejected,
    #[error("Failed to connect to MetaMask.")]
    Failed,
}

impl ConnectionError {
    pub fn classify(err: &WalletError) -> Self {
        match err {
            WalletError::NoProvider => Self::NotInstalled,
            WalletError::Provider(provider) if provider.is_no_provider() => Self::NotInstalled,
            WalletError::Provider(provider) if provider.is_user_rejection() => Self::Rejected,
            WalletError::Provider(_) | WalletError::NoAccounts => Self::Failed,
        }
    }
}
