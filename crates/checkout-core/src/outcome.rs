//! Attempt Outcomes

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Result of one customer-initiated checkout attempt.
///
/// Exactly one outcome per click, and it is terminal: nothing retries on the
/// customer's behalf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Browser sent to the hosted payment page
    Redirected { url: String },

    /// Provider order captured, browser sent to the confirmation page
    Captured { confirmation_url: String },

    /// Precondition not met, locally or according to the server
    Blocked { reason: String },

    /// Attempt failed
    Failed { kind: ErrorKind, message: String },
}

impl AttemptOutcome {
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            AttemptOutcome::Blocked { .. } => Some(ErrorKind::BlockedPrecondition),
            AttemptOutcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptOutcome::Redirected { url } => write!(f, "redirected to {url}"),
            AttemptOutcome::Captured { confirmation_url } => {
                write!(f, "captured, continuing to {confirmation_url}")
            }
            AttemptOutcome::Blocked { reason } => write!(f, "blocked: {reason}"),
            AttemptOutcome::Failed { kind, message } => write!(f, "failed ({kind}): {message}"),
        }
    }
}
