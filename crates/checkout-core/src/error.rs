//! Error Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Result type alias for server commands
pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// Statuses the server uses to refuse a command because the order is not
/// ready (shipping missing, total too low, email missing).
const PRECONDITION_STATUSES: [u16; 4] = [400, 409, 412, 422];

/// Error taxonomy surfaced on a failed attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Shipping not selected or order below minimum
    BlockedPrecondition,

    /// Non-2xx (or no response at all) from a server command
    CommandHttpError,

    /// 2xx response missing the expected field
    ProviderResponseInvalid,

    /// The interactive provider's client library reported a failure
    WidgetError,

    /// Capture failed after approval; the customer may already be charged
    CaptureAmbiguous,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BlockedPrecondition => "BLOCKED_PRECONDITION",
            ErrorKind::CommandHttpError => "COMMAND_HTTP_ERROR",
            ErrorKind::ProviderResponseInvalid => "PROVIDER_RESPONSE_INVALID",
            ErrorKind::WidgetError => "WIDGET_ERROR",
            ErrorKind::CaptureAmbiguous => "CAPTURE_AMBIGUOUS",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single server command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Server answered with a non-2xx status
    #[error("server returned HTTP {status}")]
    Status {
        status: u16,
        /// Machine-readable `error` field, when the body had one
        code: Option<String>,
        /// Human-readable `message` field, when the body had one
        message: Option<String>,
    },

    /// Request never produced a status (offline, DNS, CORS, ...)
    #[error("request failed: {0}")]
    Transport(String),

    /// 2xx response without the field the command needs
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Endpoint could not be turned into a request URL
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl CommandError {
    /// Build a status error from a raw failure body.
    ///
    /// The body is parsed best-effort as `{ "error"?, "message"? }`. Anything
    /// that does not parse leaves both fields empty.
    pub fn from_status_body(status: u16, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<FailureBody>(body).unwrap_or_default();
        Self::Status {
            status,
            code: parsed.error.filter(|s| !s.is_empty()),
            message: parsed.message.filter(|s| !s.is_empty()),
        }
    }

    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            CommandError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-supplied human message, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            CommandError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the server refused because the order is not ready yet
    pub fn is_precondition(&self) -> bool {
        self.status()
            .is_some_and(|status| PRECONDITION_STATUSES.contains(&status))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FailureBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Failure reported by the interactive provider's widget
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("widget error: {}", message.as_deref().unwrap_or("unknown"))]
pub struct WidgetError {
    pub message: Option<String>,
}

impl WidgetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn unknown() -> Self {
        Self { message: None }
    }
}

/// Checkout error types
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Configuration missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server command failed
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

impl CheckoutError {
    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            CheckoutError::Config(_) => "Checkout is not configured correctly.",
            CheckoutError::Command(_) => "Something went wrong. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_body_parsed() {
        let err = CommandError::from_status_body(
            400,
            br#"{"error":"shipping_missing","message":"Please select a shipping address first."}"#,
        );
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.server_message(), Some("Please select a shipping address first."));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_unparsable_body_degrades() {
        let err = CommandError::from_status_body(502, b"<html>Bad Gateway</html>");
        assert_eq!(
            err,
            CommandError::Status {
                status: 502,
                code: None,
                message: None
            }
        );
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_transport_has_no_status() {
        let err = CommandError::Transport("connection refused".into());
        assert_eq!(err.status(), None);
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_error_kind_serializes_screaming() {
        let json = serde_json::to_string(&ErrorKind::CaptureAmbiguous).unwrap();
        assert_eq!(json, "\"CAPTURE_AMBIGUOUS\"");
    }

    #[test]
    fn test_user_message_hides_detail() {
        let err = CheckoutError::Config("CHECKOUT_CREATE_ORDER_URL not set".into());
        assert_eq!(err.user_message(), "Checkout is not configured correctly.");
        assert!(err.to_string().contains("CHECKOUT_CREATE_ORDER_URL"));

        let err: CheckoutError = CommandError::InvalidUrl("/x".into()).into();
        assert!(matches!(err, CheckoutError::Command(_)));
    }
}
