//! # checkout-core
//!
//! Checkout orchestration across two payment providers that confirm
//! asynchronously: a hosted-page provider the browser is redirected to, and
//! an in-page button widget whose approval needs a separate server capture.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      CheckoutController                          │
//! │                                                                  │
//! │   ┌──────────────┐    ┌───────────────┐    ┌──────────────────┐  │
//! │   │ Precondition │───▶│ RedirectFlow  │───▶│                  │  │
//! │   │    Gate      │    └───────────────┘    │  CommandClient   │  │
//! │   │ (pure, sync) │    ┌───────────────┐    │    (Strategy)    │  │
//! │   │              │───▶│InteractiveFlow│───▶│                  │  │
//! │   └──────────────┘    └───────────────┘    └──────────────────┘  │
//! │            page seams: Navigator · Notifier · TriggerControl ·   │
//! │                        PaymentWidget                             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate touches the network or the DOM. Transport lives in
//! `checkout-http`, the browser binding in `checkout-web`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_core::{CheckoutConfig, CheckoutController};
//!
//! let controller = CheckoutController::new(config, client, page);
//! controller.init();
//! ```

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod interactive;
pub mod notice;
pub mod outcome;
pub mod page;
pub mod redirect;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{CommandClient, ProviderOrderCreated, ProviderOrderId, SessionCreated};
pub use config::CheckoutConfig;
pub use controller::{CheckoutController, InitStatus, init_checkout};
pub use error::{CheckoutError, CommandError, CommandResult, ErrorKind, Result, WidgetError};
pub use gate::{
    BlockReason, CartTotal, GateDecision, below_minimum_message, can_proceed, meets_minimum,
};
pub use interactive::{InteractiveFlow, InteractiveState};
pub use notice::{Notice, NoticeLevel};
pub use outcome::AttemptOutcome;
pub use page::{CheckoutPage, ClickHandler, Navigator, Notifier, PaymentWidget, TriggerControl};
pub use redirect::{RedirectFlow, RedirectState};
