//! Page Seams
//!
//! The surfaces a flow writes to. Each element has exactly one owner: the
//! redirect flow owns its trigger, the interactive flow owns the widget
//! container, and both share only the navigator and notifier.

use std::rc::Rc;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;

use crate::command::ProviderOrderId;
use crate::error::WidgetError;
use crate::notice::Notice;

/// Click callback registered on a trigger control
pub type ClickHandler = Box<dyn Fn()>;

/// Full-page navigation
pub trait Navigator {
    /// Leave the page. Nothing after this call is observable to the customer.
    fn navigate(&self, url: &str);
}

/// Dismissible, non-blocking notifications
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

/// A button that starts an attempt
pub trait TriggerControl {
    /// Enable or disable the control, with an optional explanatory hint
    fn set_enabled(&self, enabled: bool, hint: Option<&str>);

    /// Register a click handler
    fn on_click(&self, handler: ClickHandler);
}

/// The interactive provider's in-page widget and its container
#[async_trait(?Send)]
pub trait PaymentWidget {
    /// Whether the widget library is available to render with. The container
    /// still takes messages when it is not.
    fn is_loaded(&self) -> bool {
        true
    }

    /// Replace the container's content with a message
    fn show_message(&self, notice: &Notice);

    /// Render the widget bound to a server-created order.
    ///
    /// The widget's own create-order callback must hand back `order_id`
    /// unchanged; it never creates an order of its own.
    async fn render(&self, order_id: &ProviderOrderId) -> Result<(), WidgetError>;

    /// Resolve once the customer approves payment inside the widget.
    ///
    /// A cancelled popup keeps waiting; only a library failure resolves with
    /// an error.
    async fn wait_for_approval(&self) -> Result<(), WidgetError>;
}

/// Everything the controller needs from the checkout page
pub trait CheckoutPage {
    /// Shipping readiness as rendered by the server, if the page carries it
    fn shipping_ready(&self) -> Option<bool>;

    /// Raw order total, read fresh on every call
    fn cart_total_raw(&self) -> Option<String>;

    fn navigator(&self) -> Rc<dyn Navigator>;

    fn notifier(&self) -> Rc<dyn Notifier>;

    /// Redirect provider button, if present
    fn redirect_trigger(&self) -> Option<Rc<dyn TriggerControl>>;

    /// Interactive provider widget container, if present
    fn payment_widget(&self) -> Option<Rc<dyn PaymentWidget>>;

    /// Run a task on the page's event loop
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}
