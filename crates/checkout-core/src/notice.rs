//! User Notices
//!
//! Every terminal failure becomes exactly one dismissible notice.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::outcome::AttemptOutcome;

pub const SHIPPING_REQUIRED: &str = "Please select a shipping address first.";
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const REDIRECT_UNAVAILABLE: &str = "Could not start the hosted checkout. Please try again.";
pub const WIDGET_UNAVAILABLE: &str = "Unable to initialize the payment widget.";
pub const WIDGET_FAILURE_FALLBACK: &str = "Something went wrong.";
pub const CAPTURE_FAILED: &str =
    "Payment capture failed. If funds were taken from your account, please contact support.";

/// Severity of a notice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Danger,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Warning => "warning",
            NoticeLevel::Danger => "danger",
        }
    }
}

/// A non-blocking, dismissible message for the customer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Danger,
            text: text.into(),
        }
    }

    /// Notice for an attempt outcome. Navigating outcomes need none.
    pub fn for_outcome(outcome: &AttemptOutcome) -> Option<Self> {
        match outcome {
            AttemptOutcome::Redirected { .. } | AttemptOutcome::Captured { .. } => None,
            AttemptOutcome::Blocked { reason } => Some(Self::warning(reason.clone())),
            AttemptOutcome::Failed { kind: ErrorKind::BlockedPrecondition, message } => {
                Some(Self::warning(message.clone()))
            }
            AttemptOutcome::Failed { message, .. } => Some(Self::danger(message.clone())),
        }
    }

    /// Whether this notice warns about a possible charge
    pub fn is_capture_warning(&self) -> bool {
        self.text == CAPTURE_FAILED
    }
}

/// Text for a widget failure, verbatim when the widget gave one
pub fn widget_failure_text(message: Option<&str>) -> String {
    format!("Payment error: {}", message.unwrap_or(WIDGET_FAILURE_FALLBACK))
}
