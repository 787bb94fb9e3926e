//! DOM helpers shared by the modal and navbar bindings.

use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement};

pub fn doc() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document is not available"))
}

pub fn by_id(id: &str) -> Option<Element> {
    doc().ok()?.get_element_by_id(id)
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    doc()?.create_element(tag)
}

/// `<tag class="...">text</tag>`
pub fn element(tag: &str, class: &str, text: Option<&str>) -> Result<Element, JsValue> {
    let el = create_element(tag)?;
    if !class.is_empty() {
        el.set_attribute("class", class)?;
    }
    if let Some(text) = text {
        el.set_text_content(Some(text));
    }
    Ok(el)
}

pub fn button(class: &str, text: Option<&str>) -> Result<HtmlButtonElement, JsValue> {
    let el = element("button", class, text)?;
    el.set_attribute("type", "button")?;
    el.dyn_into::<HtmlButtonElement>()
        .map_err(|_| JsValue::from_str("created element is not a button"))
}

pub fn append(parent: &Element, children: &[&Element]) -> Result<(), JsValue> {
    for child in children {
        parent.append_child(child)?;
    }
    Ok(())
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn set_hidden(el: &Element, hidden: bool) {
    if let Err(err) = el.toggle_attribute_with_force("hidden", hidden) {
        debug!("failed to toggle hidden: {:?}", err);
    }
}

pub fn is_hidden(el: &Element) -> bool {
    el.has_attribute("hidden")
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    if let Err(err) = el.class_list().toggle_with_force(cls, force) {
        debug!("failed to toggle class {}: {:?}", cls, err);
    }
}

/// Returns the element with `id`, creating an empty `<div>` under `<body>`
/// when the page does not provide one.
pub fn ensure_root(id: &str) -> Result<Element, JsValue> {
    if let Some(existing) = by_id(id) {
        return Ok(existing);
    }
    let root = create_element("div")?;
    root.set_id(id);
    let body = doc()?
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    body.append_child(&root)?;
    Ok(root)
}
