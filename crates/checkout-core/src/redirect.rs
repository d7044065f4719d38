//! Redirect Provider Flow
//!
//! ```text
//! Idle ──▶ Requesting ──┬──▶ Redirecting   (terminal, page navigates away)
//!                       ├──▶ Blocked       (notice, trigger usable again)
//!                       └──▶ Failed        (notice, trigger usable again)
//! ```
//!
//! Each click is one attempt. A click while a request is in flight, or after
//! navigation has begun, is ignored.

use std::cell::RefCell;
use std::rc::Rc;

use crate::command::CommandClient;
use crate::config::CheckoutConfig;
use crate::error::{CommandError, ErrorKind};
use crate::gate::{GateDecision, can_proceed};
use crate::notice::{GENERIC_FAILURE, Notice, REDIRECT_UNAVAILABLE, SHIPPING_REQUIRED};
use crate::outcome::AttemptOutcome;
use crate::page::{Navigator, Notifier, TriggerControl};

/// Redirect flow state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedirectState {
    Idle,
    Requesting,
    Redirecting { url: String },
    Blocked { reason: String },
    Failed { kind: ErrorKind, message: String },
}

impl RedirectState {
    /// Whether a new click may start an attempt
    fn accepts_trigger(&self) -> bool {
        !matches!(self, RedirectState::Requesting | RedirectState::Redirecting { .. })
    }

    fn settled(outcome: &AttemptOutcome) -> Self {
        match outcome {
            AttemptOutcome::Redirected { url }
            | AttemptOutcome::Captured { confirmation_url: url } => {
                RedirectState::Redirecting { url: url.clone() }
            }
            AttemptOutcome::Blocked { reason } => RedirectState::Blocked {
                reason: reason.clone(),
            },
            AttemptOutcome::Failed { kind, message } => RedirectState::Failed {
                kind: *kind,
                message: message.clone(),
            },
        }
    }
}

/// Drives the hosted-page provider
pub struct RedirectFlow {
    config: Rc<CheckoutConfig>,
    client: Rc<dyn CommandClient>,
    navigator: Rc<dyn Navigator>,
    notifier: Rc<dyn Notifier>,
    trigger: Option<Rc<dyn TriggerControl>>,
    state: RefCell<RedirectState>,
}

impl RedirectFlow {
    pub fn new(
        config: Rc<CheckoutConfig>,
        client: Rc<dyn CommandClient>,
        navigator: Rc<dyn Navigator>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            client,
            navigator,
            notifier,
            trigger: None,
            state: RefCell::new(RedirectState::Idle),
        }
    }

    /// Attach the button that starts attempts
    pub fn with_trigger(mut self, trigger: Rc<dyn TriggerControl>) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn state(&self) -> RedirectState {
        self.state.borrow().clone()
    }

    /// Reflect a gate decision known before any click.
    ///
    /// A blocked gate disables the trigger with the reason as its hint, so the
    /// guaranteed-failing request is never offered.
    pub fn prepare(&self, gate: GateDecision) {
        let Some(trigger) = &self.trigger else { return };
        match gate.reason() {
            Some(reason) => trigger.set_enabled(false, Some(&reason.message(&self.config))),
            None => trigger.set_enabled(true, None),
        }
    }

    /// Run one attempt for the total currently shown on the page.
    ///
    /// Returns `None` when the click is ignored because an attempt is already
    /// in flight or the page is navigating away.
    pub async fn trigger(&self, cart_total_raw: &str) -> Option<AttemptOutcome> {
        {
            let mut state = self.state.borrow_mut();
            if !state.accepts_trigger() {
                tracing::debug!(state = ?*state, "Ignoring redirect trigger");
                return None;
            }

            if let GateDecision::Blocked(reason) = can_proceed(&self.config, cart_total_raw) {
                let outcome = AttemptOutcome::Blocked {
                    reason: reason.message(&self.config),
                };
                *state = RedirectState::settled(&outcome);
                drop(state);

                tracing::info!(reason = reason.code(), "Redirect checkout blocked by gate");
                self.notify(&outcome);
                return Some(outcome);
            }

            *state = RedirectState::Requesting;
        }

        self.set_trigger_enabled(false);
        tracing::info!(url = %self.config.create_session_url, "Requesting checkout session");

        let outcome = match self.client.create_session(&self.config.create_session_url).await {
            Ok(session) => AttemptOutcome::Redirected { url: session.url },
            Err(err) => Self::outcome_for_error(&err),
        };

        *self.state.borrow_mut() = RedirectState::settled(&outcome);

        match &outcome {
            AttemptOutcome::Redirected { url } => {
                tracing::info!(url = %url, "Redirecting to hosted checkout");
                self.navigator.navigate(url);
            }
            other => {
                tracing::warn!(outcome = %other, "Redirect checkout did not start");
                self.set_trigger_enabled(true);
                self.notify(other);
            }
        }

        Some(outcome)
    }

    fn outcome_for_error(err: &CommandError) -> AttemptOutcome {
        match err {
            CommandError::InvalidResponse(detail) => {
                tracing::error!(detail = %detail, "Session response unusable");
                AttemptOutcome::Failed {
                    kind: ErrorKind::ProviderResponseInvalid,
                    message: REDIRECT_UNAVAILABLE.into(),
                }
            }
            err if err.is_precondition() => AttemptOutcome::Blocked {
                reason: err.server_message().unwrap_or(SHIPPING_REQUIRED).to_string(),
            },
            err => AttemptOutcome::Failed {
                kind: ErrorKind::CommandHttpError,
                message: err.server_message().unwrap_or(GENERIC_FAILURE).to_string(),
            },
        }
    }

    fn set_trigger_enabled(&self, enabled: bool) {
        if let Some(trigger) = &self.trigger {
            trigger.set_enabled(enabled, None);
        }
    }

    fn notify(&self, outcome: &AttemptOutcome) {
        if let Some(notice) = Notice::for_outcome(outcome) {
            self.notifier.notify(&notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SessionCreated;
    use crate::testing::{
        Call, FakeClient, RecordingNavigator, RecordingNotifier, RecordingTrigger, config,
    };

    struct Harness {
        client: Rc<FakeClient>,
        navigator: Rc<RecordingNavigator>,
        notifier: Rc<RecordingNotifier>,
        trigger: Rc<RecordingTrigger>,
        flow: RedirectFlow,
    }

    fn harness(client: FakeClient, shipping_ready: bool) -> Harness {
        let client = Rc::new(client);
        let navigator = Rc::new(RecordingNavigator::default());
        let notifier = Rc::new(RecordingNotifier::default());
        let trigger = Rc::new(RecordingTrigger::default());
        let flow = RedirectFlow::new(
            Rc::new(config(shipping_ready)),
            client.clone(),
            navigator.clone(),
            notifier.clone(),
        )
        .with_trigger(trigger.clone());

        Harness {
            client,
            navigator,
            notifier,
            trigger,
            flow,
        }
    }

    #[tokio::test]
    async fn test_session_url_navigates_once() {
        let h = harness(
            FakeClient::default().with_session(Ok(SessionCreated {
                url: "https://pay.example/s1".into(),
            })),
            true,
        );

        let outcome = h.flow.trigger("25.00").await;

        assert_eq!(
            outcome,
            Some(AttemptOutcome::Redirected {
                url: "https://pay.example/s1".into()
            })
        );
        assert_eq!(
            h.flow.state(),
            RedirectState::Redirecting {
                url: "https://pay.example/s1".into()
            }
        );
        assert_eq!(h.navigator.visits(), vec!["https://pay.example/s1".to_string()]);
        assert_eq!(h.client.calls(), vec![Call::CreateSession("/cart/stripe/checkout/".into())]);
        assert!(h.notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_server_precondition_blocks_with_its_message() {
        let h = harness(
            FakeClient::default().with_session(Err(CommandError::from_status_body(
                400,
                br#"{"message":"Please select a shipping address first."}"#,
            ))),
            true,
        );

        let outcome = h.flow.trigger("25.00").await;

        assert_eq!(
            outcome,
            Some(AttemptOutcome::Blocked {
                reason: "Please select a shipping address first.".into()
            })
        );
        assert!(h.navigator.visits().is_empty());
        assert_eq!(
            h.notifier.notices(),
            vec![Notice::warning("Please select a shipping address first.")]
        );
        assert!(h.trigger.is_enabled());
    }

    #[tokio::test]
    async fn test_precondition_without_message_uses_fallback() {
        let h = harness(
            FakeClient::default().with_session(Err(CommandError::from_status_body(422, b""))),
            true,
        );

        let outcome = h.flow.trigger("25.00").await;

        assert_eq!(
            outcome,
            Some(AttemptOutcome::Blocked {
                reason: SHIPPING_REQUIRED.into()
            })
        );
    }

    #[tokio::test]
    async fn test_server_error_is_command_failure() {
        let h = harness(
            FakeClient::default().with_session(Err(CommandError::from_status_body(500, b"oops"))),
            true,
        );

        let outcome = h.flow.trigger("25.00").await.unwrap();

        assert_eq!(outcome.error_kind(), Some(ErrorKind::CommandHttpError));
        assert_eq!(
            h.flow.state(),
            RedirectState::Failed {
                kind: ErrorKind::CommandHttpError,
                message: GENERIC_FAILURE.into(),
            }
        );
        assert!(h.navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_missing_url_is_invalid_response() {
        let h = harness(
            FakeClient::default().with_session(Err(CommandError::InvalidResponse("no url".into()))),
            true,
        );

        let outcome = h.flow.trigger("25.00").await.unwrap();

        assert_eq!(outcome.error_kind(), Some(ErrorKind::ProviderResponseInvalid));
        assert_eq!(h.notifier.notices(), vec![Notice::danger(REDIRECT_UNAVAILABLE)]);
    }

    #[tokio::test]
    async fn test_gate_blocks_before_network() {
        let h = harness(FakeClient::default(), true);

        let outcome = h.flow.trigger("0.49").await.unwrap();

        assert_eq!(outcome.error_kind(), Some(ErrorKind::BlockedPrecondition));
        assert!(h.client.calls().is_empty());
        assert!(h.navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_missing_shipping_blocks_before_network() {
        let h = harness(FakeClient::default(), false);

        let outcome = h.flow.trigger("25.00").await;

        assert_eq!(
            outcome,
            Some(AttemptOutcome::Blocked {
                reason: SHIPPING_REQUIRED.into()
            })
        );
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_prepare_disables_trigger_with_hint() {
        let h = harness(FakeClient::default(), false);

        h.flow.prepare(can_proceed(&config(false), "25.00"));

        assert!(!h.trigger.is_enabled());
        assert_eq!(h.trigger.hint().as_deref(), Some(SHIPPING_REQUIRED));
    }

    #[tokio::test]
    async fn test_blocked_attempt_allows_retry() {
        let h = harness(
            FakeClient::default().with_session(Err(CommandError::from_status_body(400, b"{}"))),
            true,
        );

        assert!(h.flow.trigger("25.00").await.is_some());
        assert!(h.flow.trigger("25.00").await.is_some());
        assert_eq!(h.client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_click_while_requesting_is_ignored() {
        let (client, release) = FakeClient::default()
            .with_session(Ok(SessionCreated {
                url: "https://pay.example/s1".into(),
            }))
            .held();
        let h = harness(client, true);

        let (first, second, ()) = futures::join!(
            h.flow.trigger("25.00"),
            async {
                assert_eq!(h.flow.state(), RedirectState::Requesting);
                assert!(!h.trigger.is_enabled());
                h.flow.trigger("25.00").await
            },
            async {
                release.send(()).unwrap();
            },
        );

        assert!(first.is_some());
        assert_eq!(second, None);
        assert_eq!(h.client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_no_trigger_after_redirect() {
        let h = harness(
            FakeClient::default().with_session(Ok(SessionCreated {
                url: "https://pay.example/s1".into(),
            })),
            true,
        );

        h.flow.trigger("25.00").await;
        assert_eq!(h.flow.trigger("25.00").await, None);
        assert_eq!(h.navigator.visits().len(), 1);
        assert_eq!(h.client.calls().len(), 1);
    }
}
