//! Cart page guard: stop the checkout link below the minimum order total

use checkout_core::config::DEFAULT_MIN_ORDER_TOTAL;
use checkout_core::{below_minimum_message, meets_minimum};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, Window};

use crate::dom;
use crate::log;

pub const CHECKOUT_BUTTON_ID: &str = "btn-checkout";
pub const MIN_ORDER_TOAST_ID: &str = "minOrderToast";

/// Attach the guard to `#btn-checkout`. Returns `false` when the page has no
/// such button.
pub fn install(window: &Window, document: &Document) -> Result<bool, JsValue> {
    let Some(button) = dom::element(document, CHECKOUT_BUTTON_ID) else {
        return Ok(false);
    };

    let window = window.clone();
    let document = document.clone();
    let guarded = button.clone();
    let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let raw = guarded.get_attribute("data-total").unwrap_or_default();
        if meets_minimum(&raw, DEFAULT_MIN_ORDER_TOTAL) {
            return;
        }
        event.prevent_default();
        warn_below_minimum(&window, &document);
    });

    button.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
    // Lives as long as the page.
    listener.forget();
    Ok(true)
}

/// Show the page's toast through Bootstrap when it is available, else alert
fn warn_below_minimum(window: &Window, document: &Document) {
    if let Some(toast) = dom::element(document, MIN_ORDER_TOAST_ID) {
        match show_toast(window, &toast) {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => log::warn(&format!("toast failed: {e:?}")),
        }
    }

    let text = below_minimum_message("€", DEFAULT_MIN_ORDER_TOTAL);
    if window.alert_with_message(&text).is_err() {
        log::warn(&text);
    }
}

/// `bootstrap.Toast.getOrCreateInstance(el).show()`; `Ok(false)` without Bootstrap
fn show_toast(window: &Window, toast: &Element) -> Result<bool, JsValue> {
    let bootstrap = js_sys::Reflect::get(window, &JsValue::from_str("bootstrap"))?;
    if bootstrap.is_undefined() || bootstrap.is_null() {
        return Ok(false);
    }

    let toast_class = js_sys::Reflect::get(&bootstrap, &JsValue::from_str("Toast"))?;
    let get_or_create: js_sys::Function =
        js_sys::Reflect::get(&toast_class, &JsValue::from_str("getOrCreateInstance"))?
            .dyn_into()?;
    let instance = get_or_create.call1(&toast_class, toast)?;
    let show: js_sys::Function =
        js_sys::Reflect::get(&instance, &JsValue::from_str("show"))?.dyn_into()?;
    show.call0(&instance)?;
    Ok(true)
}
