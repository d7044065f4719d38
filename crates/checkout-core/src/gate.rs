//! Precondition Gate
//!
//! Decides, without any I/O, whether a checkout attempt may reach the
//! network: the order total must meet the minimum and a shipping destination
//! must be selected.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CheckoutConfig;
use crate::notice::SHIPPING_REQUIRED;

/// Digits before the separator that always fit in a [`Decimal`]
const MAX_WHOLE_DIGITS: usize = 28;

/// Order total read from the page
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CartTotal(Decimal);

impl CartTotal {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parse a raw page value such as `"12.50"` or `"12,50"`.
    ///
    /// Accepts a non-negative number with at most two fractional digits; the
    /// first comma is read as the decimal separator. A well-formed number too
    /// large for [`Decimal`] saturates at [`Decimal::MAX`].
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().replacen(',', ".", 1);

        if !normalized.bytes().any(|b| b.is_ascii_digit())
            || !normalized.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        {
            return None;
        }

        let (whole, fraction) = match normalized.split_once('.') {
            Some((_, fraction)) if fraction.contains('.') => return None,
            Some(parts) => parts,
            None => (normalized.as_str(), ""),
        };
        if fraction.len() > 2 {
            return None;
        }

        match Decimal::from_str(&normalized) {
            Ok(amount) => Some(Self(amount)),
            Err(e) if whole.len() > MAX_WHOLE_DIGITS => {
                tracing::warn!(raw = %raw, error = %e, "Cart total out of range, saturating");
                Some(Self(Decimal::MAX))
            }
            Err(_) => None,
        }
    }

    /// Parse, treating anything unparsable as zero
    pub fn parse_or_zero(raw: &str) -> Self {
        Self::parse(raw).unwrap_or(Self::ZERO)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

/// Why a checkout may not proceed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockReason {
    NoShipping,
    BelowMinimum,
}

impl BlockReason {
    pub fn code(&self) -> &'static str {
        match self {
            BlockReason::NoShipping => "NO_SHIPPING",
            BlockReason::BelowMinimum => "BELOW_MINIMUM",
        }
    }

    /// Customer-facing text
    pub fn message(&self, config: &CheckoutConfig) -> String {
        match self {
            BlockReason::NoShipping => SHIPPING_REQUIRED.into(),
            BlockReason::BelowMinimum => {
                below_minimum_message(&config.currency_symbol, config.min_order_total)
            }
        }
    }
}

/// Gate verdict for one attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Blocked(BlockReason),
}

impl GateDecision {
    pub fn is_ok(&self) -> bool {
        matches!(self, GateDecision::Proceed)
    }

    pub fn reason(&self) -> Option<BlockReason> {
        match self {
            GateDecision::Proceed => None,
            GateDecision::Blocked(reason) => Some(*reason),
        }
    }
}

/// Text shown when the total is under `minimum`
pub fn below_minimum_message(currency_symbol: &str, minimum: Decimal) -> String {
    format!("Minimum order is {currency_symbol}{minimum:.2}. Please add more items to continue.")
}

/// Minimum-total rule on its own, for pages that know the total but have no
/// shipping state yet (the cart page).
pub fn meets_minimum(cart_total_raw: &str, minimum: Decimal) -> bool {
    CartTotal::parse_or_zero(cart_total_raw).amount() >= minimum
}

/// Evaluate the gate for a raw cart total.
///
/// The minimum-total rule is checked before shipping.
pub fn can_proceed(config: &CheckoutConfig, cart_total_raw: &str) -> GateDecision {
    if !meets_minimum(cart_total_raw, config.min_order_total) {
        GateDecision::Blocked(BlockReason::BelowMinimum)
    } else if !config.shipping_ready {
        GateDecision::Blocked(BlockReason::NoShipping)
    } else {
        GateDecision::Proceed
    }
}
