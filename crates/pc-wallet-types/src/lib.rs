use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_STORAGE_KEY: &str = "propchain_wallet_address";
pub const DEFAULT_VISIBLE_CHARS: usize = 4;
pub const DEFAULT_INSTALL_URL: &str = "https://metamask.io/download/";

/// Account identifier exactly as the provider returned it. No checksum
/// validation is performed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

/// Snapshot handed to the UI layer on every change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletView {
    pub connected: bool,
    pub address: Option<String>,
    pub status: ConnectionStatus,
    pub error: Option<String>,
}

/// Host-tunable settings. Every field falls back to its default when the
/// host omits it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletConfig {
    pub storage_key: String,
    pub visible_chars: usize,
    pub install_url: String,
    pub modal_root_id: String,
    pub navbar_button_id: String,
    /// `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            visible_chars: DEFAULT_VISIBLE_CHARS,
            install_url: DEFAULT_INSTALL_URL.to_owned(),
            modal_root_id: "walletModal".to_owned(),
            navbar_button_id: "connectWalletBtn".to_owned(),
            log_level: "info".to_owned(),
        }
    }
}
