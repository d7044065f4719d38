//! PayPal Buttons binding
//!
//! Renders `paypal.Buttons(...)` bound to an order the server already created
//! and turns the SDK's `onApprove` / `onError` callbacks into a future the
//! interactive flow can await.

use std::cell::RefCell;

use async_trait::async_trait;
use checkout_core::{Notice, PaymentWidget, ProviderOrderId, WidgetError};
use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedReceiver};
use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Window};

use crate::dom::show_alert;
use crate::log;

#[wasm_bindgen]
extern "C" {
    /// The global `paypal` namespace installed by the SDK script
    #[derive(Debug, Clone)]
    pub type PaypalSdk;

    /// `paypal.Buttons(options)`
    #[wasm_bindgen(method, catch, js_name = Buttons)]
    fn buttons(this: &PaypalSdk, options: &JsValue) -> Result<PaypalButtons, JsValue>;

    #[derive(Debug, Clone)]
    pub type PaypalButtons;

    /// `buttons.render(selector)` → `Promise`
    #[wasm_bindgen(method, catch)]
    fn render(this: &PaypalButtons, selector: &str) -> Result<Promise, JsValue>;
}

/// The SDK namespace, if its script has loaded
pub fn sdk(window: &Window) -> Option<PaypalSdk> {
    let value = Reflect::get(window, &JsValue::from_str("paypal")).ok()?;
    (!value.is_undefined() && !value.is_null()).then(|| value.unchecked_into())
}

pub const SDK_MISSING: &str = "PayPal SDK not loaded.";

type Approval = Result<(), WidgetError>;

/// Callbacks handed to the SDK; dropped with the widget
struct Callbacks {
    _create_order: Closure<dyn FnMut() -> JsValue>,
    _on_approve: Closure<dyn FnMut(JsValue) -> JsValue>,
    _on_error: Closure<dyn FnMut(JsValue)>,
}

/// The PayPal container, with the SDK when its script loaded. Without the
/// SDK the container still shows messages but nothing renders.
pub struct PaypalWidget {
    sdk: Option<PaypalSdk>,
    document: Document,
    container: Element,
    selector: String,
    approvals: RefCell<Option<UnboundedReceiver<Approval>>>,
    callbacks: RefCell<Option<Callbacks>>,
}

impl PaypalWidget {
    pub fn new(sdk: Option<PaypalSdk>, document: Document, container: Element) -> Self {
        let selector = format!("#{}", container.id());
        Self {
            sdk,
            document,
            container,
            selector,
            approvals: RefCell::new(None),
            callbacks: RefCell::new(None),
        }
    }
}

#[async_trait(?Send)]
impl PaymentWidget for PaypalWidget {
    fn is_loaded(&self) -> bool {
        self.sdk.is_some()
    }

    fn show_message(&self, notice: &Notice) {
        show_alert(&self.document, &self.container, notice);
    }

    async fn render(&self, order_id: &ProviderOrderId) -> Result<(), WidgetError> {
        let Some(sdk) = &self.sdk else {
            return Err(WidgetError::new(SDK_MISSING));
        };

        let (tx, rx) = mpsc::unbounded::<Approval>();
        *self.approvals.borrow_mut() = Some(rx);

        let id = order_id.as_str().to_string();
        let create_order = Closure::<dyn FnMut() -> JsValue>::new(move || JsValue::from_str(&id));

        let approved = tx.clone();
        let on_approve = Closure::<dyn FnMut(JsValue) -> JsValue>::new(move |_data: JsValue| {
            let _ = approved.unbounded_send(Ok(()));
            JsValue::UNDEFINED
        });

        let on_error = Closure::<dyn FnMut(JsValue)>::new(move |err: JsValue| {
            log::error(&format!("PayPal error: {err:?}"));
            let _ = tx.unbounded_send(Err(widget_error(&err)));
        });

        let options = Object::new();
        set(&options, "createOrder", create_order.as_ref())?;
        set(&options, "onApprove", on_approve.as_ref())?;
        set(&options, "onError", on_error.as_ref())?;

        let buttons = sdk.buttons(&options).map_err(|e| widget_error(&e))?;
        *self.callbacks.borrow_mut() = Some(Callbacks {
            _create_order: create_order,
            _on_approve: on_approve,
            _on_error: on_error,
        });

        let rendered = buttons.render(&self.selector).map_err(|e| widget_error(&e))?;
        JsFuture::from(rendered)
            .await
            .map(|_| ())
            .map_err(|e| widget_error(&e))
    }

    async fn wait_for_approval(&self) -> Result<(), WidgetError> {
        // Cancelling the popup fires neither callback, so this keeps waiting.
        let receiver = self.approvals.borrow_mut().take();
        let Some(mut receiver) = receiver else {
            return Err(WidgetError::new("widget not rendered"));
        };
        receiver
            .next()
            .await
            .unwrap_or_else(|| Err(WidgetError::unknown()))
    }
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), WidgetError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| widget_error(&e))
}

/// `err.message` when the SDK supplied one, or the error itself if it is a string
fn widget_error(err: &JsValue) -> WidgetError {
    let message = Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .filter(|m| !m.is_empty());
    WidgetError { message }
}
