//! # checkout-http
//!
//! HTTP transport for the checkout server commands.
//!
//! ```text
//!   RedirectFlow / InteractiveFlow
//!              │  CommandClient
//!              ▼
//!   ┌─────────────────────┐   POST + X-CSRFToken   ┌──────────────┐
//!   │  HttpCommandClient  │───────────────────────▶│  shop server │
//!   │  (reqwest, url)     │◀───────────────────────│              │
//!   └─────────────────────┘   { url } / { id }     └──────────────┘
//! ```

pub mod client;
pub mod csrf;

pub use client::{HttpClientConfig, HttpCommandClient};
pub use csrf::{CSRF_COOKIE_NAME, CSRF_HEADER_NAME, CsrfToken};
