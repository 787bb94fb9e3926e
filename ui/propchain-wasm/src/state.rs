//! Global application state.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).

use crate::events::ClickListener;
use crate::modal::ConnectionModal;
use crate::storage::LocalStorageStore;
use pc_wallet_core::ConnectionController;
use pc_wallet_types::WalletConfig;
use std::cell::RefCell;
use std::rc::Rc;

pub type Controller = ConnectionController<LocalStorageStore>;

#[derive(Default)]
pub struct AppState {
    pub config: WalletConfig,
    pub controller: Option<Rc<Controller>>,
    pub modal: Option<ConnectionModal>,
    pub navbar_listener: Option<ClickListener>,
}

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState::default());
}

/// Run a closure with shared read access to the state.
pub fn with<F, R>(f: F) -> R
where
    F: FnOnce(&AppState) -> R,
{
    STATE.with(|s| f(&s.borrow()))
}

/// Run a closure with mutable access to the state.
pub fn with_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut AppState) -> R,
{
    STATE.with(|s| f(&mut s.borrow_mut()))
}

pub fn config() -> WalletConfig {
    with(|s| s.config.clone())
}

pub fn controller() -> Option<Rc<Controller>> {
    with(|s| s.controller.clone())
}

pub fn modal() -> Option<ConnectionModal> {
    with(|s| s.modal.clone())
}

/// Replaces the running session. The previous controller and navbar
/// listener, if any, are returned so the caller can release them outside the
/// state borrow.
pub fn install(
    config: WalletConfig,
    controller: Rc<Controller>,
    modal: ConnectionModal,
    navbar_listener: Option<ClickListener>,
) -> (Option<Rc<Controller>>, Option<ClickListener>) {
    with_mut(|s| {
        s.config = config;
        s.modal = Some(modal);
        let previous_listener = std::mem::replace(&mut s.navbar_listener, navbar_listener);
        (s.controller.replace(controller), previous_listener)
    })
}

/// Ends the running session, unbinding the navbar button.
pub fn take_controller() -> Option<Rc<Controller>> {
    let (controller, listener) = with_mut(|s| (s.controller.take(), s.navbar_listener.take()));
    drop(listener);
    controller
}

pub fn has_navbar_listener() -> bool {
    with(|s| s.navbar_listener.is_some())
}
