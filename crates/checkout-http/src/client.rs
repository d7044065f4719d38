//! HTTP Command Client
//!
//! `reqwest` implementation of [`CommandClient`]. The same code runs natively
//! and in the browser, where reqwest goes through `fetch`.

use async_trait::async_trait;
use checkout_core::config::capture_url;
use checkout_core::{
    CheckoutError, CommandClient, CommandError, CommandResult, ProviderOrderCreated,
    ProviderOrderId, SessionCreated,
};
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::Instrument;
use url::Url;

use crate::csrf::{CSRF_HEADER_NAME, CsrfToken};

/// Client settings
#[derive(Clone, Debug, Default)]
pub struct HttpClientConfig {
    /// Base that relative endpoint paths are joined onto
    pub base_url: Option<Url>,

    pub csrf_token: CsrfToken,

    /// Total request timeout in seconds; ignored in the browser
    pub timeout_secs: Option<u64>,
}

impl HttpClientConfig {
    /// Read `CHECKOUT_BASE_URL`, `CHECKOUT_CSRF_TOKEN` and
    /// `CHECKOUT_HTTP_TIMEOUT_SECS`. All are optional.
    pub fn from_env() -> checkout_core::Result<Self> {
        let base_url = match std::env::var("CHECKOUT_BASE_URL") {
            Ok(raw) => Some(Url::parse(&raw).map_err(|e| {
                CheckoutError::Config(format!("CHECKOUT_BASE_URL is not a URL: {e}"))
            })?),
            Err(_) => None,
        };
        let csrf_token = std::env::var("CHECKOUT_CSRF_TOKEN")
            .map(CsrfToken::new)
            .unwrap_or_default();
        let timeout_secs = std::env::var("CHECKOUT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok());

        Ok(Self {
            base_url,
            csrf_token,
            timeout_secs,
        })
    }
}

/// Server command client over HTTP
#[derive(Clone, Debug)]
pub struct HttpCommandClient {
    http: reqwest::Client,
    base_url: Option<Url>,
    csrf_token: CsrfToken,
}

impl HttpCommandClient {
    /// Client with no base URL; endpoints must be absolute
    pub fn new(csrf_token: CsrfToken) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: None,
            csrf_token,
        }
    }

    pub fn from_config(config: HttpClientConfig) -> checkout_core::Result<Self> {
        Ok(Self {
            http: build_http(config.timeout_secs)?,
            base_url: config.base_url,
            csrf_token: config.csrf_token,
        })
    }

    pub fn from_env() -> checkout_core::Result<Self> {
        Self::from_config(HttpClientConfig::from_env()?)
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Turn a configured endpoint into a request URL
    pub fn resolve(&self, endpoint: &str) -> CommandResult<Url> {
        let resolved = match &self.base_url {
            Some(base) => base.join(endpoint),
            None => Url::parse(endpoint),
        };
        resolved.map_err(|e| CommandError::InvalidUrl(format!("{endpoint}: {e}")))
    }

    /// Issue one bodiless command and return the 2xx body
    async fn post(&self, command: &'static str, endpoint: &str) -> CommandResult<Vec<u8>> {
        let url = self.resolve(endpoint)?;
        let span = tracing::info_span!("command", command, url = %url);

        async move {
            let token = HeaderValue::from_str(self.csrf_token.as_str())
                .map_err(|e| CommandError::Transport(format!("unusable CSRF token: {e}")))?;

            let response = self
                .http
                .post(url)
                .header(CSRF_HEADER_NAME, token)
                .header(ACCEPT, HeaderValue::from_static("application/json"))
                .send()
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "Command request failed");
                    CommandError::Transport(e.to_string())
                })?;

            let status = response.status();
            // A body that cannot be read is treated like an empty one.
            let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            tracing::info!(status = status.as_u16(), "Command answered");

            if status.is_success() {
                Ok(body)
            } else {
                Err(CommandError::from_status_body(status.as_u16(), &body))
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_http(timeout_secs: Option<u64>) -> checkout_core::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder
            .timeout(std::time::Duration::from_secs(secs))
            .connect_timeout(std::time::Duration::from_secs(secs.min(10)));
    }
    builder
        .build()
        .map_err(|e| CheckoutError::Config(format!("HTTP client: {e}")))
}

#[cfg(target_arch = "wasm32")]
fn build_http(_timeout_secs: Option<u64>) -> checkout_core::Result<reqwest::Client> {
    Ok(reqwest::Client::new())
}

#[async_trait(?Send)]
impl CommandClient for HttpCommandClient {
    async fn create_session(&self, url: &str) -> CommandResult<SessionCreated> {
        let body = self.post("create_session", url).await?;
        SessionCreated::from_body(&body)
    }

    async fn create_provider_order(&self, url: &str) -> CommandResult<ProviderOrderCreated> {
        let body = self.post("create_provider_order", url).await?;
        ProviderOrderCreated::from_body(&body)
    }

    async fn capture_provider_order(
        &self,
        url_template: &str,
        order_id: &ProviderOrderId,
    ) -> CommandResult<()> {
        self.post("capture_provider_order", &capture_url(url_template, order_id))
            .await
            .map(|_| ())
    }
}
