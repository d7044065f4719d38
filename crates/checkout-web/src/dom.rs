//! DOM implementations of the navigation, notification and trigger seams

use std::cell::RefCell;

use checkout_core::{ClickHandler, Navigator, Notice, Notifier, TriggerControl};
use checkout_http::{CSRF_COOKIE_NAME, CsrfToken};
use checkout_http::csrf::parse_cookie_value;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlDocument, Window};

use crate::log;

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn element(document: &Document, id: &str) -> Option<Element> {
    document.get_element_by_id(id)
}

/// Token from `window.csrfToken`, else the `csrftoken` cookie, else empty
pub fn csrf_token(window: &Window, document: &Document) -> CsrfToken {
    let global = js_sys::Reflect::get(window, &JsValue::from_str("csrfToken"))
        .ok()
        .and_then(|v| v.as_string())
        .filter(|t| !t.is_empty());
    if let Some(token) = global {
        return CsrfToken::new(token);
    }

    document
        .dyn_ref::<HtmlDocument>()
        .and_then(|doc| doc.cookie().ok())
        .and_then(|cookies| parse_cookie_value(&cookies, CSRF_COOKIE_NAME))
        .map(|raw| {
            js_sys::decode_uri_component(&raw)
                .ok()
                .and_then(|decoded| decoded.as_string())
                .unwrap_or(raw)
        })
        .map(CsrfToken::new)
        .unwrap_or_default()
}

/// Full-page navigation through `window.location`
pub struct DomNavigator {
    window: Window,
}

impl DomNavigator {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Navigator for DomNavigator {
    fn navigate(&self, url: &str) {
        if let Err(e) = self.window.location().set_href(url) {
            log::error(&format!("navigation to {url} failed: {e:?}"));
        }
    }
}

pub const NOTICES_ID: &str = "checkout-notices";

/// Notices shown as dismissible Bootstrap alerts in `#checkout-notices`.
///
/// The area is created at the top of `host` (or the body) when the page has
/// none. `window.alert` is used only when no area can be found or made.
pub struct DomNotifier {
    window: Window,
    document: Document,
    host: Option<Element>,
}

impl DomNotifier {
    pub fn new(window: Window, document: Document, host: Option<Element>) -> Self {
        Self {
            window,
            document,
            host,
        }
    }

    fn area(&self) -> Option<Element> {
        if let Some(area) = element(&self.document, NOTICES_ID) {
            return Some(area);
        }

        let host = self
            .host
            .clone()
            .or_else(|| self.document.body().map(Element::from))?;
        let area = self.document.create_element("div").ok()?;
        area.set_id(NOTICES_ID);
        host.prepend_with_node_1(&area).ok()?;
        Some(area)
    }

    fn show(&self, area: &Element, notice: &Notice) -> Result<(), JsValue> {
        let alert = self.document.create_element("div")?;
        alert.set_class_name(&notice_class(notice));
        alert.set_attribute("role", "alert")?;
        alert.set_text_content(Some(&notice.text));

        let close = self.document.create_element("button")?;
        close.set_class_name("btn-close");
        close.set_attribute("type", "button")?;
        close.set_attribute("data-bs-dismiss", "alert")?;
        close.set_attribute("aria-label", "Close")?;

        // Works without Bootstrap's script; frees itself after one click.
        let dismissed = alert.clone();
        let on_close = Closure::once_into_js(move || dismissed.remove());
        close.add_event_listener_with_callback("click", on_close.unchecked_ref())?;

        alert.append_child(&close)?;
        area.set_inner_html("");
        area.append_child(&alert)?;
        Ok(())
    }
}

impl Notifier for DomNotifier {
    fn notify(&self, notice: &Notice) {
        if let Some(area) = self.area() {
            match self.show(&area, notice) {
                Ok(()) => return,
                Err(e) => log::warn(&format!("could not show notice: {e:?}")),
            }
        }

        if self.window.alert_with_message(&notice.text).is_err() {
            log::warn(&notice.text);
        }
    }
}

/// A `<button>` driving the redirect flow
pub struct ButtonTrigger {
    button: HtmlButtonElement,
    listeners: RefCell<Vec<Closure<dyn FnMut()>>>,
}

impl ButtonTrigger {
    pub fn new(button: HtmlButtonElement) -> Self {
        Self {
            button,
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Wrap the element with `id` if it is a button
    pub fn find(document: &Document, id: &str) -> Option<Self> {
        element(document, id)?
            .dyn_into::<HtmlButtonElement>()
            .ok()
            .map(Self::new)
    }
}

impl TriggerControl for ButtonTrigger {
    fn set_enabled(&self, enabled: bool, hint: Option<&str>) {
        self.button.set_disabled(!enabled);
        self.button.set_title(hint.unwrap_or_default());
    }

    fn on_click(&self, handler: ClickHandler) {
        let listener = Closure::<dyn FnMut()>::new(move || handler());
        let added = self
            .button
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref());
        match added {
            // The listener must outlive this call; the button owns it from here.
            Ok(()) => self.listeners.borrow_mut().push(listener),
            Err(e) => log::error(&format!("could not register click handler: {e:?}")),
        }
    }
}

/// Replace `container`'s content with a Bootstrap alert holding `notice`
pub fn show_alert(document: &Document, container: &Element, notice: &Notice) {
    let Ok(alert) = document.create_element("div") else {
        return;
    };
    alert.set_class_name(&alert_class(notice));
    alert.set_text_content(Some(&notice.text));
    container.set_inner_html("");
    if let Err(e) = container.append_child(&alert) {
        log::error(&format!("could not show message: {e:?}"));
    }
}

fn alert_class(notice: &Notice) -> String {
    format!("alert alert-{} mb-0", notice.level.as_str())
}

fn notice_class(notice: &Notice) -> String {
    format!("alert alert-{} alert-dismissible fade show", notice.level.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_class_follows_level() {
        assert_eq!(alert_class(&Notice::warning("x")), "alert alert-warning mb-0");
        assert_eq!(alert_class(&Notice::danger("x")), "alert alert-danger mb-0");
    }

    #[test]
    fn test_notices_are_dismissible() {
        let class = notice_class(&Notice::danger("Payment capture failed."));
        assert_eq!(class, "alert alert-danger alert-dismissible fade show");
        assert!(!class.contains("mb-0"));
        assert_eq!(
            notice_class(&Notice::warning("x")),
            "alert alert-warning alert-dismissible fade show"
        );
    }
}
