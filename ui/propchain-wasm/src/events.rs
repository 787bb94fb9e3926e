//! Event binding.
//!
//! Wires the modal and navbar to the controller, and re-renders both on every
//! controller change.

use crate::dom;
use crate::modal::ConnectionModal;
use crate::navbar;
use crate::state::Controller;
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

/// Helper: attach a click handler that lives as long as the page.
macro_rules! on_click {
    ($el:expr, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::MouseEvent)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

type ClickHandler = Closure<dyn FnMut(web_sys::MouseEvent)>;

/// Click listener on an element that outlives the modal (the navbar button).
/// Removed from the element when dropped.
pub struct ClickListener {
    target: Element,
    handler: ClickHandler,
}

impl ClickListener {
    pub fn attach(
        target: &Element,
        handler: impl FnMut(web_sys::MouseEvent) + 'static,
    ) -> Result<Self, JsValue> {
        let handler: ClickHandler =
            Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::MouseEvent)>);
        target.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            handler,
        })
    }
}

impl Drop for ClickListener {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback("click", self.handler.as_ref().unchecked_ref())
        {
            debug!("failed to remove click listener: {:?}", err);
        }
    }
}

/// Bind all wallet UI listeners. Call once per mounted modal.
///
/// Modal listeners die with the modal's elements when it is remounted. The
/// navbar button belongs to the page, so its listener is returned and must be
/// kept alive by the caller; dropping it unbinds the button.
pub fn bind_events(
    modal: &ConnectionModal,
    navbar_button: Option<&Element>,
    controller: &Rc<Controller>,
    visible_chars: usize,
) -> Result<Option<ClickListener>, JsValue> {
    // ── Connect ──
    {
        let weak = Rc::downgrade(controller);
        on_click!(modal.connect_btn, move |_: web_sys::MouseEvent| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            wasm_bindgen_futures::spawn_local(async move {
                controller.connect().await;
            });
        });
    }

    // ── Disconnect ──
    {
        let weak = Rc::downgrade(controller);
        on_click!(modal.disconnect_btn, move |_: web_sys::MouseEvent| {
            if let Some(controller) = weak.upgrade() {
                controller.disconnect();
            }
        });
    }

    // ── Close ──
    for close_btn in &modal.close_btns {
        let modal2 = modal.clone();
        on_click!(close_btn, move |_: web_sys::MouseEvent| {
            modal2.close();
        });
    }

    // ── Navbar opens the modal ──
    let navbar_listener = match navbar_button {
        Some(button) => {
            let modal2 = modal.clone();
            let weak = Rc::downgrade(controller);
            Some(ClickListener::attach(button, move |_: web_sys::MouseEvent| {
                if let Some(controller) = weak.upgrade() {
                    modal2.render(&controller.view(), controller.is_provider_available());
                }
                modal2.open();
            })?)
        }
        None => None,
    };

    // ── Re-render on change ──
    {
        let modal2 = modal.clone();
        let navbar_button = navbar_button.cloned();
        let weak = Rc::downgrade(controller);
        controller.on_change(move |view| {
            let available = weak
                .upgrade()
                .is_some_and(|controller| controller.is_provider_available());
            modal2.render(view, available);
            if let Some(button) = &navbar_button {
                navbar::render(button, view, visible_chars);
            }
        });
    }

    // Initial paint
    modal.render(&controller.view(), controller.is_provider_available());
    if let Some(button) = navbar_button {
        navbar::render(button, &controller.view(), visible_chars);
    }

    Ok(navbar_listener)
}

/// Navbar button configured by id, if the page has one.
pub fn navbar_button(id: &str) -> Option<Element> {
    dom::by_id(id)
}
