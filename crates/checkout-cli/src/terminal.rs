//! Terminal stand-ins for the checkout page

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use checkout_core::{
    CheckoutPage, ClickHandler, Navigator, Notice, Notifier, PaymentWidget, ProviderOrderId,
    TriggerControl, WidgetError,
};
use futures::future::LocalBoxFuture;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

/// Prints the destination instead of leaving the page
#[derive(Default)]
pub struct TerminalNavigator {
    last: RefCell<Option<String>>,
}

impl TerminalNavigator {
    pub fn last(&self) -> Option<String> {
        self.last.borrow().clone()
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, url: &str) {
        println!("navigate: {url}");
        *self.last.borrow_mut() = Some(url.to_string());
    }
}

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: &Notice) {
        eprintln!("[{}] {}", notice.level.as_str(), notice.text);
    }
}

pub struct TerminalTrigger {
    enabled: Cell<bool>,
    hint: RefCell<Option<String>>,
    handlers: RefCell<Vec<ClickHandler>>,
}

impl Default for TerminalTrigger {
    fn default() -> Self {
        Self {
            enabled: Cell::new(true),
            hint: RefCell::new(None),
            handlers: RefCell::new(Vec::new()),
        }
    }
}

impl TerminalTrigger {
    /// Press the button. A disabled button does nothing, as in a browser.
    pub fn click(&self) -> bool {
        if !self.enabled.get() {
            let hint = self.hint.borrow().clone().unwrap_or_default();
            eprintln!("button disabled: {hint}");
            return false;
        }
        for handler in self.handlers.borrow().iter() {
            handler();
        }
        true
    }
}

impl TriggerControl for TerminalTrigger {
    fn set_enabled(&self, enabled: bool, hint: Option<&str>) {
        tracing::debug!(enabled, hint = ?hint, "Trigger state");
        self.enabled.set(enabled);
        *self.hint.borrow_mut() = hint.map(str::to_string);
    }

    fn on_click(&self, handler: ClickHandler) {
        self.handlers.borrow_mut().push(handler);
    }
}

/// Approval prompt on stdin.
///
/// An empty line (or `y`) approves, `cancel` keeps waiting like a closed
/// popup, `error <message>` reports a widget failure.
pub struct TerminalWidget;

#[async_trait(?Send)]
impl PaymentWidget for TerminalWidget {
    fn show_message(&self, notice: &Notice) {
        eprintln!("[widget:{}] {}", notice.level.as_str(), notice.text);
    }

    async fn render(&self, order_id: &ProviderOrderId) -> Result<(), WidgetError> {
        println!("order {order_id} ready; press Enter to approve");
        Ok(())
    }

    async fn wait_for_approval(&self) -> Result<(), WidgetError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|e| WidgetError::new(e.to_string()))?;
            let Some(line) = line else {
                return Err(WidgetError::new("input closed"));
            };

            match line.trim() {
                "" | "y" | "yes" => return Ok(()),
                "cancel" => eprintln!("approval cancelled; still waiting"),
                other => match other.strip_prefix("error") {
                    Some(message) => return Err(WidgetError::new(message.trim())),
                    None => eprintln!("unrecognized input {other:?}"),
                },
            }
        }
    }
}

/// Page made of the terminal pieces; spawned tasks run on the current
/// `LocalSet` and are awaited by [`TerminalPage::settle`].
pub struct TerminalPage {
    shipping_ready: Option<bool>,
    cart_total: String,
    pub navigator: Rc<TerminalNavigator>,
    notifier: Rc<TerminalNotifier>,
    pub trigger: Option<Rc<TerminalTrigger>>,
    widget: Option<Rc<TerminalWidget>>,
    tasks: RefCell<Vec<JoinHandle<()>>>,
}

impl TerminalPage {
    fn new(cart_total: String, shipping_ready: Option<bool>) -> Self {
        Self {
            shipping_ready,
            cart_total,
            navigator: Rc::new(TerminalNavigator::default()),
            notifier: Rc::new(TerminalNotifier),
            trigger: None,
            widget: None,
            tasks: RefCell::new(Vec::new()),
        }
    }

    /// Page carrying only the redirect provider's button
    pub fn redirect(cart_total: String, shipping_ready: Option<bool>) -> Self {
        Self {
            trigger: Some(Rc::new(TerminalTrigger::default())),
            ..Self::new(cart_total, shipping_ready)
        }
    }

    /// Page carrying only the interactive provider's widget
    pub fn interactive(cart_total: String, shipping_ready: Option<bool>) -> Self {
        Self {
            widget: Some(Rc::new(TerminalWidget)),
            ..Self::new(cart_total, shipping_ready)
        }
    }

    /// Wait for every spawned task, including ones spawned meanwhile
    pub async fn settle(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                if let Err(e) = task.await {
                    tracing::error!(error = %e, "Checkout task failed");
                }
            }
        }
    }
}

impl CheckoutPage for TerminalPage {
    fn shipping_ready(&self) -> Option<bool> {
        self.shipping_ready
    }

    fn cart_total_raw(&self) -> Option<String> {
        Some(self.cart_total.clone())
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
        self.tasks.borrow_mut().push(tokio::task::spawn_local(task));
    }
}
