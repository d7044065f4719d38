//! Checkout Page Controller
//!
//! Single entry point: evaluates the gate once for the page, wires the
//! redirect button and starts the interactive widget with that same decision,
//! so both providers show a consistent blocked or ready state.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::command::CommandClient;
use crate::config::CheckoutConfig;
use crate::error::Result;
use crate::gate::can_proceed;
use crate::interactive::InteractiveFlow;
use crate::page::CheckoutPage;
use crate::redirect::RedirectFlow;

/// What [`CheckoutController::init`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStatus {
    /// Handlers registered and widget started
    Wired,
    /// A previous call already wired this page; nothing registered
    AlreadyWired,
}

pub struct CheckoutController {
    config: CheckoutConfig,
    client: Rc<dyn CommandClient>,
    page: Rc<dyn CheckoutPage>,
    wired: Cell<bool>,
}

impl CheckoutController {
    pub fn new(
        config: CheckoutConfig,
        client: Rc<dyn CommandClient>,
        page: Rc<dyn CheckoutPage>,
    ) -> Self {
        Self {
            config,
            client,
            page,
            wired: Cell::new(false),
        }
    }

    /// Validate the configuration, then build a controller
    pub fn try_new(
        config: CheckoutConfig,
        client: Rc<dyn CommandClient>,
        page: Rc<dyn CheckoutPage>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config, client, page))
    }

    /// Configuration with the page's own shipping state applied.
    ///
    /// The server-rendered page is the fresher source; the configured value
    /// is used when the page does not carry one.
    pub fn effective_config(&self) -> CheckoutConfig {
        match self.page.shipping_ready() {
            Some(ready) => self.config.clone().with_shipping_ready(ready),
            None => self.config.clone(),
        }
    }

    /// Wire the page. Safe to call more than once; only the first call
    /// registers anything.
    pub fn init(&self) -> InitStatus {
        if self.wired.replace(true) {
            tracing::warn!("Checkout already initialized on this page");
            return InitStatus::AlreadyWired;
        }

        let config = Rc::new(self.effective_config());
        let cart_total = self.page.cart_total_raw().unwrap_or_default();
        let gate = can_proceed(&config, &cart_total);
        tracing::info!(
            shipping_ready = config.shipping_ready,
            cart_total = %cart_total,
            blocked = ?gate.reason(),
            "Initializing checkout"
        );

        if let Some(trigger) = self.page.redirect_trigger() {
            let flow = Rc::new(
                RedirectFlow::new(
                    config.clone(),
                    self.client.clone(),
                    self.page.navigator(),
                    self.page.notifier(),
                )
                .with_trigger(trigger.clone()),
            );
            flow.prepare(gate);

            let page: Weak<dyn CheckoutPage> = Rc::downgrade(&self.page);
            trigger.on_click(Box::new(move || {
                let Some(page) = page.upgrade() else { return };
                let cart_total = page.cart_total_raw().unwrap_or_default();
                let flow = flow.clone();
                page.spawn(Box::pin(async move {
                    flow.trigger(&cart_total).await;
                }));
            }));
        } else {
            tracing::debug!("No redirect trigger on page");
        }

        if let Some(widget) = self.page.payment_widget() {
            let flow = InteractiveFlow::new(
                config,
                self.client.clone(),
                self.page.navigator(),
                self.page.notifier(),
                widget,
            );
            self.page.spawn(Box::pin(async move {
                flow.run(gate).await;
            }));
        } else {
            tracing::debug!("No payment widget on page");
        }

        InitStatus::Wired
    }
}

/// Build a controller for the page and wire it
pub fn init_checkout(
    config: CheckoutConfig,
    client: Rc<dyn CommandClient>,
    page: Rc<dyn CheckoutPage>,
) -> Result<CheckoutController> {
    let controller = CheckoutController::try_new(config, client, page)?;
    controller.init();
    Ok(controller)
}
