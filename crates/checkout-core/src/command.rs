//! Server Command Client
//!
//! Three commands, all `POST`, all carrying the page's anti-forgery token:
//!
//! | Command | Success body |
//! |---|---|
//! | create session | `{ "url": "..." }` |
//! | create provider order | `{ "id": "..." }` |
//! | capture provider order | ignored |
//!
//! Implementations issue exactly one request per call. Retrying is the
//! customer's decision (a new click), never the client's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CommandError, CommandResult};

/// Order id created server-side with the interactive provider.
///
/// Scoped to one attempt: the widget is bound to it and the capture consumes
/// it. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderOrderId(String);

impl ProviderOrderId {
    /// Wrap a server-issued id, rejecting blank values
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProviderOrderId {
    type Error = CommandError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| CommandError::InvalidResponse("empty order id".into()))
    }
}

impl From<ProviderOrderId> for String {
    fn from(id: ProviderOrderId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ProviderOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hosted checkout session created by the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionCreated {
    /// Hosted payment page to navigate to
    pub url: String,
}

impl SessionCreated {
    /// Parse a 2xx body; a missing or blank `url` is an invalid response
    pub fn from_body(body: &[u8]) -> CommandResult<Self> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(default)]
            url: Option<String>,
        }

        let wire: Wire = serde_json::from_slice(body)
            .map_err(|e| CommandError::InvalidResponse(format!("session body: {e}")))?;

        match wire.url {
            Some(url) if !url.trim().is_empty() => Ok(Self { url }),
            _ => Err(CommandError::InvalidResponse("session response has no url".into())),
        }
    }
}

/// Provider order created by the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderOrderCreated {
    pub id: ProviderOrderId,
}

impl ProviderOrderCreated {
    /// Parse a 2xx body; a missing or blank `id` is an invalid response
    pub fn from_body(body: &[u8]) -> CommandResult<Self> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(default)]
            id: Option<String>,
        }

        let wire: Wire = serde_json::from_slice(body)
            .map_err(|e| CommandError::InvalidResponse(format!("order body: {e}")))?;

        wire.id
            .and_then(ProviderOrderId::new)
            .map(|id| Self { id })
            .ok_or_else(|| CommandError::InvalidResponse("order response has no id".into()))
    }
}

/// Strategy trait for the server command transport
///
/// Futures are not `Send`: the client runs on the page's single event loop.
#[async_trait(?Send)]
pub trait CommandClient {
    /// Ask the server for a hosted checkout session
    async fn create_session(&self, url: &str) -> CommandResult<SessionCreated>;

    /// Ask the server to create an order with the interactive provider
    async fn create_provider_order(&self, url: &str) -> CommandResult<ProviderOrderCreated>;

    /// Ask the server to capture an approved provider order
    async fn capture_provider_order(
        &self,
        url_template: &str,
        order_id: &ProviderOrderId,
    ) -> CommandResult<()>;
}
