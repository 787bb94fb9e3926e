//! Navbar wallet button.

use crate::dom;
use pc_wallet_client::truncate;
use pc_wallet_types::WalletView;
use tracing::debug;
use web_sys::Element;

pub const CONNECT_LABEL: &str = "Connect Wallet";

pub fn label(view: &WalletView, visible_chars: usize) -> String {
    match &view.address {
        Some(address) if view.connected => truncate(address, visible_chars),
        _ => CONNECT_LABEL.to_owned(),
    }
}

pub fn render(button: &Element, view: &WalletView, visible_chars: usize) {
    dom::set_text(button, &label(view, visible_chars));
    dom::toggle_class(button, "connected", view.connected);
    let result = match &view.address {
        Some(address) if view.connected => button.set_attribute("title", address),
        _ => button.remove_attribute("title"),
    };
    if let Err(err) = result {
        debug!("failed to update navbar title: {:?}", err);
    }
}
