//! PropChain wallet connection for the browser.
//!
//! Binds the wallet-connection core to `window.ethereum`, `localStorage` and
//! the page's connect-wallet modal. Page code reaches the connection state
//! through the exported `initWallet` / `connectWallet` / `disconnectWallet` /
//! `walletView` / `onWalletChange` functions.

pub mod dom;
pub mod events;
pub mod logging;
pub mod modal;
pub mod navbar;
pub mod provider;
pub mod state;
pub mod storage;

use modal::ConnectionModal;
use pc_wallet_client::WalletClient;
use pc_wallet_core::ConnectionController;
use pc_wallet_types::{WalletConfig, WalletView};
use provider::InjectedProvider;
use serde::Serialize;
use std::rc::Rc;
use storage::LocalStorageStore;
use tracing::info;
use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// Builds the controller, mounts the modal and binds the navbar button.
/// Accepts an optional config object; omitted fields use their defaults.
#[wasm_bindgen(js_name = initWallet)]
pub fn init_wallet(config: JsValue) -> Result<(), JsValue> {
    let config = parse_config(config)?;
    logging::init(&config.log_level);

    let client = WalletClient::with_storage_key(
        InjectedProvider::from_window(),
        LocalStorageStore,
        &config.storage_key,
    );
    let controller = Rc::new(ConnectionController::new(client));
    info!(
        "wallet initialised: status={} provider={}",
        controller.status().as_str(),
        controller.is_provider_available()
    );

    let modal = ConnectionModal::mount(&config)?;
    let navbar_button = events::navbar_button(&config.navbar_button_id);
    let navbar_listener = events::bind_events(
        &modal,
        navbar_button.as_ref(),
        &controller,
        config.visible_chars,
    )?;

    let (previous, previous_listener) =
        state::install(config, controller, modal, navbar_listener);
    drop(previous_listener);
    if let Some(previous) = previous {
        previous.shutdown();
    }
    Ok(())
}

#[wasm_bindgen(js_name = connectWallet)]
pub async fn connect_wallet() -> Result<(), JsValue> {
    let controller = state::controller().ok_or_else(not_initialised)?;
    controller.connect().await;
    Ok(())
}

#[wasm_bindgen(js_name = disconnectWallet)]
pub fn disconnect_wallet() -> Result<(), JsValue> {
    let controller = state::controller().ok_or_else(not_initialised)?;
    controller.disconnect();
    Ok(())
}

/// `{ connected, address, status, error }` for page code.
#[wasm_bindgen(js_name = walletView)]
pub fn wallet_view() -> Result<JsValue, JsValue> {
    let view = state::controller()
        .map(|controller| controller.view())
        .unwrap_or_default();
    to_js(&view)
}

/// Registers `callback(view)` to run after every connection change.
#[wasm_bindgen(js_name = onWalletChange)]
pub fn on_wallet_change(callback: js_sys::Function) -> Result<(), JsValue> {
    let controller = state::controller().ok_or_else(not_initialised)?;
    controller.on_change(move |view: &WalletView| {
        let Ok(value) = to_js(view) else {
            return;
        };
        if let Err(err) = callback.call1(&JsValue::NULL, &value) {
            tracing::warn!("wallet change callback failed: {:?}", err);
        }
    });
    Ok(())
}

#[wasm_bindgen(js_name = openWalletModal)]
pub fn open_wallet_modal() {
    if let Some(modal) = state::modal() {
        modal.open();
    }
}

#[wasm_bindgen(js_name = truncateAddress)]
pub fn truncate_address(address: &str, visible_chars: Option<usize>) -> String {
    let visible = visible_chars.unwrap_or_else(|| state::config().visible_chars);
    pc_wallet_client::truncate(address, visible)
}

/// Releases the provider listener, e.g. on page teardown.
#[wasm_bindgen(js_name = shutdownWallet)]
pub fn shutdown_wallet() {
    if let Some(controller) = state::take_controller() {
        controller.shutdown();
    }
}

fn parse_config(value: JsValue) -> Result<WalletConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(WalletConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(JsValue::from)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn not_initialised() -> JsValue {
    JsValue::from_str("wallet is not initialised; call initWallet first")
}
