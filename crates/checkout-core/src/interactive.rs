//! Interactive Provider Flow
//!
//! ```text
//! Idle ─▶ CreatingOrder ─┬─▶ WidgetReady ─▶ ApprovalPending ─▶ Capturing ─┬─▶ Completed
//!                        ├─▶ Blocked                                      └─▶ CaptureFailed
//!                        └─▶ Failed  (also reachable from WidgetReady / ApprovalPending)
//! ```
//!
//! One order is created on the server per attempt and the widget is bound to
//! it. The order id moves from step to step and is consumed by the capture,
//! so an attempt can capture at most once.

use std::cell::RefCell;
use std::rc::Rc;

use crate::command::{CommandClient, ProviderOrderId};
use crate::config::CheckoutConfig;
use crate::error::{CommandError, ErrorKind, WidgetError};
use crate::gate::GateDecision;
use crate::notice::{self, CAPTURE_FAILED, Notice, SHIPPING_REQUIRED, WIDGET_UNAVAILABLE};
use crate::outcome::AttemptOutcome;
use crate::page::{Navigator, Notifier, PaymentWidget};

/// Interactive flow state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractiveState {
    Idle,
    CreatingOrder,
    WidgetReady { order_id: ProviderOrderId },
    ApprovalPending { order_id: ProviderOrderId },
    Capturing { order_id: ProviderOrderId },
    Completed,
    CaptureFailed,
    Blocked { reason: String },
    Failed { kind: ErrorKind, message: String },
}

impl InteractiveState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InteractiveState::Completed
                | InteractiveState::CaptureFailed
                | InteractiveState::Blocked { .. }
                | InteractiveState::Failed { .. }
        )
    }
}

/// Order the customer approved in the widget, ready for capture
struct ApprovedOrder(ProviderOrderId);

/// Drives the in-page widget provider
pub struct InteractiveFlow {
    config: Rc<CheckoutConfig>,
    client: Rc<dyn CommandClient>,
    navigator: Rc<dyn Navigator>,
    notifier: Rc<dyn Notifier>,
    widget: Rc<dyn PaymentWidget>,
    state: RefCell<InteractiveState>,
}

impl InteractiveFlow {
    pub fn new(
        config: Rc<CheckoutConfig>,
        client: Rc<dyn CommandClient>,
        navigator: Rc<dyn Navigator>,
        notifier: Rc<dyn Notifier>,
        widget: Rc<dyn PaymentWidget>,
    ) -> Self {
        Self {
            config,
            client,
            navigator,
            notifier,
            widget,
            state: RefCell::new(InteractiveState::Idle),
        }
    }

    pub fn state(&self) -> InteractiveState {
        self.state.borrow().clone()
    }

    fn enter(&self, next: InteractiveState) {
        tracing::debug!(state = ?next, "Interactive checkout transition");
        *self.state.borrow_mut() = next;
    }

    /// Run the single attempt this flow owns.
    ///
    /// `gate` is the decision the controller made for the page; a blocked gate
    /// puts its message in the widget container and creates no order. Returns
    /// `None` if the flow has already run.
    pub async fn run(&self, gate: GateDecision) -> Option<AttemptOutcome> {
        let state = self.state();
        if state != InteractiveState::Idle {
            tracing::debug!(terminal = state.is_terminal(), "Interactive checkout already started");
            return None;
        }

        if let GateDecision::Blocked(reason) = gate {
            let reason = reason.message(&self.config);
            self.widget.show_message(&Notice::warning(reason.clone()));
            return Some(self.settle(AttemptOutcome::Blocked { reason }));
        }

        if !self.widget.is_loaded() {
            tracing::warn!("Payment widget library not loaded");
            self.widget.show_message(&Notice::danger(WIDGET_UNAVAILABLE));
            return Some(self.settle(AttemptOutcome::Failed {
                kind: ErrorKind::WidgetError,
                message: WIDGET_UNAVAILABLE.into(),
            }));
        }

        let order_id = match self.create_order().await {
            Ok(order_id) => order_id,
            Err(outcome) => return Some(self.settle(outcome)),
        };

        let approved = match self.await_approval(order_id).await {
            Ok(approved) => approved,
            Err(err) => return Some(self.widget_failed(&err)),
        };

        Some(self.capture(approved).await)
    }

    async fn create_order(&self) -> Result<ProviderOrderId, AttemptOutcome> {
        self.enter(InteractiveState::CreatingOrder);
        tracing::info!(url = %self.config.create_order_url, "Creating provider order");

        match self.client.create_provider_order(&self.config.create_order_url).await {
            Ok(created) => Ok(created.id),
            Err(err @ CommandError::Status { .. }) => {
                let reason = err.server_message().unwrap_or(SHIPPING_REQUIRED).to_string();
                tracing::info!(status = ?err.status(), reason = %reason, "Provider order refused");
                self.widget.show_message(&Notice::warning(reason.clone()));
                Err(AttemptOutcome::Blocked { reason })
            }
            Err(err) => {
                tracing::error!(error = %err, "Provider order could not be created");
                self.widget.show_message(&Notice::danger(WIDGET_UNAVAILABLE));
                let kind = match err {
                    CommandError::InvalidResponse(_) => ErrorKind::ProviderResponseInvalid,
                    _ => ErrorKind::CommandHttpError,
                };
                Err(AttemptOutcome::Failed {
                    kind,
                    message: WIDGET_UNAVAILABLE.into(),
                })
            }
        }
    }

    async fn await_approval(
        &self,
        order_id: ProviderOrderId,
    ) -> Result<ApprovedOrder, WidgetError> {
        self.enter(InteractiveState::WidgetReady {
            order_id: order_id.clone(),
        });
        self.widget.render(&order_id).await?;

        tracing::info!(order_id = %order_id, "Widget ready, waiting for approval");
        self.enter(InteractiveState::ApprovalPending {
            order_id: order_id.clone(),
        });
        self.widget.wait_for_approval().await?;

        Ok(ApprovedOrder(order_id))
    }

    async fn capture(&self, approved: ApprovedOrder) -> AttemptOutcome {
        let ApprovedOrder(order_id) = approved;
        self.enter(InteractiveState::Capturing {
            order_id: order_id.clone(),
        });
        tracing::info!(order_id = %order_id, "Capturing approved order");

        let result = self
            .client
            .capture_provider_order(&self.config.capture_order_url_template, &order_id)
            .await;

        match result {
            Ok(()) => {
                self.enter(InteractiveState::Completed);
                let url = self.config.confirmation_url.clone();
                tracing::info!(order_id = %order_id, url = %url, "Order captured");
                self.navigator.navigate(&url);
                AttemptOutcome::Captured {
                    confirmation_url: url,
                }
            }
            Err(err) => {
                self.enter(InteractiveState::CaptureFailed);
                tracing::error!(
                    order_id = %order_id,
                    error = %err,
                    "Capture failed after approval; customer may have been charged"
                );
                self.notifier.notify(&Notice::danger(CAPTURE_FAILED));
                AttemptOutcome::Failed {
                    kind: ErrorKind::CaptureAmbiguous,
                    message: CAPTURE_FAILED.into(),
                }
            }
        }
    }

    fn widget_failed(&self, err: &WidgetError) -> AttemptOutcome {
        tracing::error!(error = %err, "Payment widget failed");
        let outcome = AttemptOutcome::Failed {
            kind: ErrorKind::WidgetError,
            message: notice::widget_failure_text(err.message.as_deref()),
        };
        if let Some(notice) = Notice::for_outcome(&outcome) {
            self.notifier.notify(&notice);
        }
        self.settle(outcome)
    }

    fn settle(&self, outcome: AttemptOutcome) -> AttemptOutcome {
        let next = match &outcome {
            AttemptOutcome::Blocked { reason } => InteractiveState::Blocked {
                reason: reason.clone(),
            },
            AttemptOutcome::Failed { kind, message } => InteractiveState::Failed {
                kind: *kind,
                message: message.clone(),
            },
            AttemptOutcome::Captured { .. } | AttemptOutcome::Redirected { .. } => {
                InteractiveState::Completed
            }
        };
        self.enter(next);
        outcome
    }
}
