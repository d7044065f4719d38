//! In-memory fakes for the command client and page seams

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;

use crate::command::{CommandClient, ProviderOrderCreated, ProviderOrderId, SessionCreated};
use crate::config::{CheckoutConfig, capture_url};
use crate::error::{CommandError, CommandResult, WidgetError};
use crate::notice::Notice;
use crate::page::{CheckoutPage, ClickHandler, Navigator, Notifier, PaymentWidget, TriggerControl};

pub fn config(shipping_ready: bool) -> CheckoutConfig {
    CheckoutConfig::new(
        "/cart/stripe/checkout/",
        "/cart/paypal/create/",
        "/cart/paypal/capture/__ORDER_ID__/",
        "/cart/thank-you/",
    )
    .with_shipping_ready(shipping_ready)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    CreateSession(String),
    CreateOrder(String),
    Capture(String),
}

/// Command client answering from canned responses
pub struct FakeClient {
    session: CommandResult<SessionCreated>,
    order: CommandResult<ProviderOrderCreated>,
    capture: CommandResult<()>,
    hold: RefCell<Option<oneshot::Receiver<()>>>,
    calls: RefCell<Vec<Call>>,
}

impl Default for FakeClient {
    fn default() -> Self {
        let unexpected = || CommandError::Transport("unexpected call".into());
        Self {
            session: Err(unexpected()),
            order: Err(unexpected()),
            capture: Err(unexpected()),
            hold: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeClient {
    pub fn with_session(mut self, response: CommandResult<SessionCreated>) -> Self {
        self.session = response;
        self
    }

    pub fn with_order(mut self, response: CommandResult<ProviderOrderCreated>) -> Self {
        self.order = response;
        self
    }

    pub fn with_capture(mut self, response: CommandResult<()>) -> Self {
        self.capture = response;
        self
    }

    /// Make the next command wait until the returned sender fires
    pub fn held(self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        *self.hold.borrow_mut() = Some(rx);
        (self, tx)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    async fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
        let hold = self.hold.borrow_mut().take();
        if let Some(rx) = hold {
            let _ = rx.await;
        }
    }
}

#[async_trait(?Send)]
impl CommandClient for FakeClient {
    async fn create_session(&self, url: &str) -> CommandResult<SessionCreated> {
        self.record(Call::CreateSession(url.into())).await;
        self.session.clone()
    }

    async fn create_provider_order(&self, url: &str) -> CommandResult<ProviderOrderCreated> {
        self.record(Call::CreateOrder(url.into())).await;
        self.order.clone()
    }

    async fn capture_provider_order(
        &self,
        url_template: &str,
        order_id: &ProviderOrderId,
    ) -> CommandResult<()> {
        self.record(Call::Capture(capture_url(url_template, order_id))).await;
        self.capture.clone()
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visits: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.visits.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visits.borrow_mut().push(url.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }
}

pub struct RecordingTrigger {
    enabled: Cell<bool>,
    hint: RefCell<Option<String>>,
    handlers: RefCell<Vec<ClickHandler>>,
}

impl Default for RecordingTrigger {
    fn default() -> Self {
        Self {
            enabled: Cell::new(true),
            hint: RefCell::new(None),
            handlers: RefCell::new(Vec::new()),
        }
    }
}

impl RecordingTrigger {
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn hint(&self) -> Option<String> {
        self.hint.borrow().clone()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Fire every registered handler, as a browser click would
    pub fn click(&self) {
        for handler in self.handlers.borrow().iter() {
            handler();
        }
    }
}

impl TriggerControl for RecordingTrigger {
    fn set_enabled(&self, enabled: bool, hint: Option<&str>) {
        self.enabled.set(enabled);
        *self.hint.borrow_mut() = hint.map(str::to_string);
    }

    fn on_click(&self, handler: ClickHandler) {
        self.handlers.borrow_mut().push(handler);
    }
}

/// Widget that renders and approves according to a script
pub struct FakeWidget {
    loaded: bool,
    render: Result<(), WidgetError>,
    approval: Result<(), WidgetError>,
    rendered: RefCell<Vec<ProviderOrderId>>,
    messages: RefCell<Vec<Notice>>,
}

impl Default for FakeWidget {
    fn default() -> Self {
        Self {
            loaded: true,
            render: Ok(()),
            approval: Ok(()),
            rendered: RefCell::new(Vec::new()),
            messages: RefCell::new(Vec::new()),
        }
    }
}

impl FakeWidget {
    pub fn unloaded(mut self) -> Self {
        self.loaded = false;
        self
    }

    pub fn failing_render(mut self, err: WidgetError) -> Self {
        self.render = Err(err);
        self
    }

    pub fn failing_approval(mut self, err: WidgetError) -> Self {
        self.approval = Err(err);
        self
    }

    pub fn rendered(&self) -> Vec<ProviderOrderId> {
        self.rendered.borrow().clone()
    }

    pub fn messages(&self) -> Vec<Notice> {
        self.messages.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PaymentWidget for FakeWidget {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn show_message(&self, notice: &Notice) {
        self.messages.borrow_mut().push(notice.clone());
    }

    async fn render(&self, order_id: &ProviderOrderId) -> Result<(), WidgetError> {
        self.rendered.borrow_mut().push(order_id.clone());
        self.render.clone()
    }

    async fn wait_for_approval(&self) -> Result<(), WidgetError> {
        self.approval.clone()
    }
}

/// Checkout page built from the fakes above; spawned tasks queue until
/// [`FakePage::run_tasks`] drives them.
pub struct FakePage {
    pub shipping_ready: Option<bool>,
    pub cart_total: RefCell<Option<String>>,
    pub navigator: Rc<RecordingNavigator>,
    pub notifier: Rc<RecordingNotifier>,
    pub trigger: Option<Rc<RecordingTrigger>>,
    pub widget: Option<Rc<FakeWidget>>,
    tasks: RefCell<VecDeque<LocalBoxFuture<'static, ()>>>,
}

impl FakePage {
    pub fn new(cart_total: &str) -> Self {
        Self {
            shipping_ready: None,
            cart_total: RefCell::new(Some(cart_total.to_string())),
            navigator: Rc::new(RecordingNavigator::default()),
            notifier: Rc::new(RecordingNotifier::default()),
            trigger: Some(Rc::new(RecordingTrigger::default())),
            widget: Some(Rc::new(FakeWidget::default())),
            tasks: RefCell::new(VecDeque::new()),
        }
    }

    pub fn trigger(&self) -> &RecordingTrigger {
        self.trigger.as_deref().expect("page has a trigger")
    }

    pub fn widget(&self) -> &FakeWidget {
        self.widget.as_deref().expect("page has a widget")
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Run queued tasks to completion, including ones they spawn
    pub async fn run_tasks(&self) {
        loop {
            let next = self.tasks.borrow_mut().pop_front();
            match next {
                Some(task) => task.await,
                None => break,
            }
        }
    }
}

impl CheckoutPage for FakePage {
    fn shipping_ready(&self) -> Option<bool> {
        self.shipping_ready
    }

    fn cart_total_raw(&self) -> Option<String> {
        self.cart_total.borrow().clone()
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
        self.tasks.borrow_mut().push_back(task);
    }
}
