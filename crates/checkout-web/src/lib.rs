//! checkout-web
//!
//! Browser entry points for the checkout page and the cart page.
//!
//! ```js
//! import init, { initCheckout, initCartGuard } from "./pkg/checkout_web.js";
//!
//! await init();
//! initCheckout({
//!     stripeUrl: "/cart/stripe/checkout/",
//!     paypalCreateUrl: "/cart/paypal/create/",
//!     paypalCaptureUrl: "/cart/paypal/capture/__ORDER_ID__/",
//!     thankYouUrl: "/cart/thank-you/",
//! });
//! initCartGuard();
//! ```

mod cart_guard;
mod dom;
mod log;
mod page;
mod paypal;

use std::cell::RefCell;
use std::rc::Rc;

use checkout_core::{CheckoutConfig, CheckoutController, InitStatus};
use checkout_http::HttpCommandClient;
use wasm_bindgen::prelude::*;

pub use page::DomCheckoutPage;
pub use paypal::PaypalWidget;

thread_local! {
    static CONTROLLER: RefCell<Option<CheckoutController>> = const { RefCell::new(None) };
}

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

/// Wire the checkout page. Calling it again on the same page does nothing.
#[wasm_bindgen(js_name = initCheckout)]
pub fn init_checkout(cfg: JsValue) -> Result<(), JsValue> {
    let already = CONTROLLER.with(|slot| {
        slot.borrow()
            .as_ref()
            .is_some_and(|controller| controller.init() == InitStatus::AlreadyWired)
    });
    if already {
        log::warn("initCheckout called twice; ignoring");
        return Ok(());
    }

    let config: CheckoutConfig = serde_wasm_bindgen::from_value(cfg)?;
    if let Err(e) = config.validate() {
        log::error(&e.to_string());
        return Err(JsValue::from_str(e.user_message()));
    }

    let window = dom::window()?;
    let document = dom::document()?;

    let origin = window.location().origin()?;
    let base_url = url::Url::parse(&origin).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let client =
        HttpCommandClient::new(dom::csrf_token(&window, &document)).with_base_url(base_url);
    let page = DomCheckoutPage::from_document(&document)?;

    let controller = CheckoutController::new(config, Rc::new(client), Rc::new(page));
    controller.init();
    log::info("checkout initialized");

    CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));
    Ok(())
}

/// Block the cart page's checkout button below the minimum order total
#[wasm_bindgen(js_name = initCartGuard)]
pub fn init_cart_guard() -> Result<(), JsValue> {
    let window = dom::window()?;
    let document = dom::document()?;
    if !cart_guard::install(&window, &document)? {
        log::info("no checkout button on this page");
    }
    Ok(())
}
