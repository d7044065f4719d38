//! Checkout Configuration
//!
//! Supplied once per page load and never mutated afterwards. The browser
//! binding deserializes it from the object passed to `initCheckout`; the CLI
//! builds it from the environment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::command::ProviderOrderId;
use crate::error::{CheckoutError, Result};

/// Placeholder in the capture URL template replaced by the provider order id
pub const ORDER_ID_PLACEHOLDER: &str = "__ORDER_ID__";

/// Smallest order total the providers accept
pub const DEFAULT_MIN_ORDER_TOTAL: Decimal = dec!(0.50);

/// Immutable checkout configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfig {
    /// Endpoint creating a hosted checkout session (redirect provider)
    #[serde(alias = "stripeUrl")]
    pub create_session_url: String,

    /// Endpoint creating a provider order (interactive provider)
    #[serde(alias = "paypalCreateUrl")]
    pub create_order_url: String,

    /// Capture endpoint containing [`ORDER_ID_PLACEHOLDER`]
    #[serde(alias = "paypalCaptureUrl")]
    pub capture_order_url_template: String,

    /// Where the browser goes after a successful capture
    #[serde(alias = "thankYouUrl")]
    pub confirmation_url: String,

    /// Whether a shipping destination has been chosen
    #[serde(default = "default_shipping_ready")]
    pub shipping_ready: bool,

    /// Minimum order total
    #[serde(default = "default_min_order_total")]
    pub min_order_total: Decimal,

    /// Currency symbol used in user-facing amounts
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_shipping_ready() -> bool {
    true
}

fn default_min_order_total() -> Decimal {
    DEFAULT_MIN_ORDER_TOTAL
}

fn default_currency_symbol() -> String {
    "€".into()
}

impl CheckoutConfig {
    /// Create a configuration with default minimum total and currency
    pub fn new(
        create_session_url: impl Into<String>,
        create_order_url: impl Into<String>,
        capture_order_url_template: impl Into<String>,
        confirmation_url: impl Into<String>,
    ) -> Self {
        Self {
            create_session_url: create_session_url.into(),
            create_order_url: create_order_url.into(),
            capture_order_url_template: capture_order_url_template.into(),
            confirmation_url: confirmation_url.into(),
            shipping_ready: default_shipping_ready(),
            min_order_total: default_min_order_total(),
            currency_symbol: default_currency_symbol(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary key lookup (environment, `.env`, tests)
    ///
    /// | Variable | Required |
    /// |---|---|
    /// | `CHECKOUT_CREATE_SESSION_URL` | yes |
    /// | `CHECKOUT_CREATE_ORDER_URL` | yes |
    /// | `CHECKOUT_CAPTURE_ORDER_URL` | yes |
    /// | `CHECKOUT_CONFIRMATION_URL` | yes |
    /// | `CHECKOUT_SHIPPING_READY` | no, default `true` |
    /// | `CHECKOUT_MIN_ORDER_TOTAL` | no, default `0.50` |
    /// | `CHECKOUT_CURRENCY_SYMBOL` | no, default `€` |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| CheckoutError::Config(format!("{key} not set")))
        };

        let mut config = Self::new(
            required("CHECKOUT_CREATE_SESSION_URL")?,
            required("CHECKOUT_CREATE_ORDER_URL")?,
            required("CHECKOUT_CAPTURE_ORDER_URL")?,
            required("CHECKOUT_CONFIRMATION_URL")?,
        );

        if let Some(raw) = lookup("CHECKOUT_SHIPPING_READY") {
            config.shipping_ready = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(CheckoutError::Config(format!(
                        "CHECKOUT_SHIPPING_READY must be a boolean, got {other:?}"
                    )));
                }
            };
        }

        if let Some(raw) = lookup("CHECKOUT_MIN_ORDER_TOTAL") {
            config.min_order_total = raw.trim().parse().map_err(|_| {
                CheckoutError::Config(format!("CHECKOUT_MIN_ORDER_TOTAL is not a decimal: {raw:?}"))
            })?;
        }

        if let Some(symbol) = lookup("CHECKOUT_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no attempt could succeed with
    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("createSessionUrl", &self.create_session_url),
            ("createOrderUrl", &self.create_order_url),
            ("captureOrderUrlTemplate", &self.capture_order_url_template),
            ("confirmationUrl", &self.confirmation_url),
        ];
        for (name, value) in urls {
            if value.trim().is_empty() {
                return Err(CheckoutError::Config(format!("{name} is empty")));
            }
        }

        if !self.capture_order_url_template.contains(ORDER_ID_PLACEHOLDER) {
            return Err(CheckoutError::Config(format!(
                "captureOrderUrlTemplate must contain {ORDER_ID_PLACEHOLDER}"
            )));
        }

        if self.min_order_total.is_sign_negative() {
            return Err(CheckoutError::Config("minOrderTotal must not be negative".into()));
        }

        Ok(())
    }

    /// Copy of this configuration with a different shipping state
    pub fn with_shipping_ready(mut self, shipping_ready: bool) -> Self {
        self.shipping_ready = shipping_ready;
        self
    }

    /// Capture URL for one provider order
    pub fn capture_url(&self, order_id: &ProviderOrderId) -> String {
        capture_url(&self.capture_order_url_template, order_id)
    }
}

/// Substitute the order id into a capture URL template
pub fn capture_url(template: &str, order_id: &ProviderOrderId) -> String {
    template.replace(ORDER_ID_PLACEHOLDER, order_id.as_str())
}
