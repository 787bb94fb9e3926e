//! Connect-wallet modal.
//!
//! The element tree is built once at mount; `render` only flips `hidden`,
//! `disabled` and text so the click handlers bound in `events.rs` stay valid.

use crate::dom;
use pc_wallet_types::{ConnectionStatus, WalletConfig, WalletView};
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlButtonElement};

#[derive(Clone)]
pub struct ConnectionModal {
    pub root: Element,
    pub install_notice: Element,
    pub connect_btn: HtmlButtonElement,
    pub connecting_label: Element,
    pub connected_panel: Element,
    pub address_text: Element,
    pub disconnect_btn: HtmlButtonElement,
    pub error_panel: Element,
    pub error_text: Element,
    pub close_btns: Vec<HtmlButtonElement>,
}

impl ConnectionModal {
    pub fn mount(config: &WalletConfig) -> Result<Self, JsValue> {
        let root = dom::ensure_root(&config.modal_root_id)?;
        root.set_inner_html("");
        root.set_attribute("class", "wallet-modal")?;
        root.set_attribute("role", "dialog")?;

        let dialog = dom::element("div", "wallet-modal__dialog", None)?;

        // Header
        let header = dom::element("div", "wallet-modal__header", None)?;
        let title = dom::element("h3", "wallet-modal__title", Some("Connect Wallet"))?;
        let header_close = dom::button("wallet-modal__close", Some("\u{2715}"))?;
        header_close.set_attribute("aria-label", "Close")?;
        dom::append(&header, &[&title, &header_close])?;

        // Install notice
        let install_notice = dom::element("div", "wallet-modal__notice", None)?;
        let notice_text = dom::element(
            "p",
            "",
            Some("MetaMask is not detected. Please install MetaMask to continue."),
        )?;
        let install_link = dom::element("a", "wallet-modal__link", Some("Download MetaMask"))?;
        install_link.set_attribute("href", &config.install_url)?;
        install_link.set_attribute("target", "_blank")?;
        install_link.set_attribute("rel", "noreferrer")?;
        dom::append(&install_notice, &[&notice_text, &install_link])?;

        // Wallet option
        let connect_btn = dom::button("wallet-modal__option", None)?;
        let option_name = dom::element("span", "wallet-modal__option-name", Some("MetaMask"))?;
        let connecting_label =
            dom::element("span", "wallet-modal__connecting", Some("Connecting..."))?;
        dom::append(&connect_btn, &[&option_name, &connecting_label])?;

        // Connected
        let connected_panel = dom::element("div", "wallet-modal__connected", None)?;
        let connected_caption = dom::element("p", "", Some("Connected address:"))?;
        let address_text = dom::element("p", "wallet-modal__address", None)?;
        let disconnect_btn = dom::button("wallet-modal__disconnect", Some("Disconnect"))?;
        dom::append(
            &connected_panel,
            &[&connected_caption, &address_text, &disconnect_btn],
        )?;

        // Error
        let error_panel = dom::element("div", "wallet-modal__error", None)?;
        let error_text = dom::element("p", "", None)?;
        dom::append(&error_panel, &[&error_text])?;

        let body = dom::element("div", "wallet-modal__body", None)?;
        dom::append(
            &body,
            &[&install_notice, &connect_btn, &connected_panel, &error_panel],
        )?;

        let footer = dom::element("div", "wallet-modal__footer", None)?;
        let footer_close = dom::button("wallet-modal__dismiss", Some("Close"))?;
        dom::append(&footer, &[&footer_close])?;

        dom::append(&dialog, &[&header, &body, &footer])?;
        dom::append(&root, &[&dialog])?;

        let modal = Self {
            root,
            install_notice,
            connect_btn,
            connecting_label,
            connected_panel,
            address_text,
            disconnect_btn,
            error_panel,
            error_text,
            close_btns: vec![header_close, footer_close],
        };
        modal.close();
        Ok(modal)
    }

    pub fn render(&self, view: &WalletView, provider_available: bool) {
        let connecting = view.status == ConnectionStatus::Connecting;

        dom::set_hidden(&self.install_notice, provider_available);
        self.connect_btn
            .set_disabled(connecting || !provider_available);
        dom::toggle_class(&self.connect_btn, "unavailable", !provider_available);
        dom::set_hidden(&self.connecting_label, !connecting);

        match (&view.address, view.status) {
            (Some(address), ConnectionStatus::Connected) => {
                dom::set_text(&self.address_text, address);
                dom::set_hidden(&self.connected_panel, false);
            }
            _ => {
                dom::set_text(&self.address_text, "");
                dom::set_hidden(&self.connected_panel, true);
            }
        }

        match (&view.error, view.status) {
            (Some(message), ConnectionStatus::Error) => {
                dom::set_text(&self.error_text, message);
                dom::set_hidden(&self.error_panel, false);
            }
            _ => {
                dom::set_text(&self.error_text, "");
                dom::set_hidden(&self.error_panel, true);
            }
        }
    }

    pub fn open(&self) {
        dom::set_hidden(&self.root, false);
    }

    pub fn close(&self) {
        dom::set_hidden(&self.root, true);
    }

    pub fn is_open(&self) -> bool {
        !dom::is_hidden(&self.root)
    }
}
