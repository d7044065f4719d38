//! The checkout page as seen through the DOM

use std::rc::Rc;

use checkout_core::{CheckoutPage, Navigator, Notifier, PaymentWidget, TriggerControl};
use futures::future::LocalBoxFuture;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

use crate::dom::{self, ButtonTrigger, DomNavigator, DomNotifier};
use crate::log;
use crate::paypal::{self, PaypalWidget};

pub const ROOT_ID: &str = "checkout-root";
pub const REDIRECT_TRIGGER_ID: &str = "pay-stripe";
pub const WIDGET_CONTAINER_ID: &str = "paypal-button-container";

pub struct DomCheckoutPage {
    root: Option<Element>,
    navigator: Rc<DomNavigator>,
    notifier: Rc<DomNotifier>,
    trigger: Option<Rc<ButtonTrigger>>,
    widget: Option<Rc<PaypalWidget>>,
}

impl DomCheckoutPage {
    /// Look up every element the checkout uses. Missing elements are fine.
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        let window = dom::window()?;

        let widget = dom::element(document, WIDGET_CONTAINER_ID).map(|container| {
            let sdk = paypal::sdk(&window);
            if sdk.is_none() {
                log::warn(paypal::SDK_MISSING);
            }
            Rc::new(PaypalWidget::new(sdk, document.clone(), container))
        });

        let root = dom::element(document, ROOT_ID);
        Ok(Self {
            navigator: Rc::new(DomNavigator::new(window.clone())),
            notifier: Rc::new(DomNotifier::new(window, document.clone(), root.clone())),
            root,
            trigger: ButtonTrigger::find(document, REDIRECT_TRIGGER_ID).map(Rc::new),
            widget,
        })
    }

    fn root_attr(&self, name: &str) -> Option<String> {
        self.root.as_ref()?.get_attribute(name)
    }
}

impl CheckoutPage for DomCheckoutPage {
    fn shipping_ready(&self) -> Option<bool> {
        self.root_attr("data-shipping-ready").map(|v| v == "1")
    }

    fn cart_total_raw(&self) -> Option<String> {
        self.root_attr("data-total")
    }

    fn navigator(&self) -> Rc<dyn Navigator> {
        self.navigator.clone()
    }

    fn notifier(&self) -> Rc<dyn Notifier> {
        self.notifier.clone()
    }

    fn redirect_trigger(&self) -> Option<Rc<dyn TriggerControl>> {
        self.trigger.clone().map(|t| t as Rc<dyn TriggerControl>)
    }

    fn payment_widget(&self) -> Option<Rc<dyn PaymentWidget>> {
        self.widget.clone().map(|w| w as Rc<dyn PaymentWidget>)
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
