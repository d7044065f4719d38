//! checkout-cli
//!
//! Runs the checkout flows against a live shop server from the terminal:
//! evaluate the precondition gate, start a hosted checkout, or create,
//! approve and capture an in-page provider order.

mod terminal;

use std::rc::Rc;

use anyhow::Context;
use checkout_core::{CheckoutConfig, CheckoutController, GateDecision, can_proceed};
use checkout_http::HttpCommandClient;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::terminal::TerminalPage;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate the precondition gate for a cart total
    Gate {
        /// Raw total as the page shows it ("12.50" or "12,50")
        #[arg(long)]
        total: String,

        /// Override CHECKOUT_SHIPPING_READY
        #[arg(long)]
        shipping_ready: Option<bool>,
    },

    /// Create a hosted checkout session and print where the browser would go
    Redirect {
        #[arg(long)]
        total: String,

        #[arg(long)]
        shipping_ready: Option<bool>,
    },

    /// Create a provider order, wait for approval on stdin, then capture it
    Interactive {
        #[arg(long)]
        total: String,

        #[arg(long)]
        shipping_ready: Option<bool>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = CheckoutConfig::from_env().context("loading checkout configuration")?;

    match cli.command {
        Command::Gate { total, shipping_ready } => {
            gate(&config, &total, shipping_ready)
        }
        Command::Redirect { total, shipping_ready } => {
            let page = TerminalPage::redirect(total, shipping_ready);
            run(config, page).await
        }
        Command::Interactive { total, shipping_ready } => {
            let page = TerminalPage::interactive(total, shipping_ready);
            run(config, page).await
        }
    }
}

fn gate(config: &CheckoutConfig, total: &str, shipping_ready: Option<bool>) -> anyhow::Result<()> {
    let config = match shipping_ready {
        Some(ready) => config.clone().with_shipping_ready(ready),
        None => config.clone(),
    };

    let report = match can_proceed(&config, total) {
        GateDecision::Proceed => serde_json::json!({ "decision": "proceed" }),
        GateDecision::Blocked(reason) => serde_json::json!({
            "decision": "blocked",
            "reason": reason.code(),
            "message": reason.message(&config),
        }),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Wire the page, press the redirect button if there is one, and wait for
/// every flow to settle.
async fn run(config: CheckoutConfig, page: TerminalPage) -> anyhow::Result<()> {
    let client = HttpCommandClient::from_env().context("building HTTP client")?;
    check_endpoints(&client, &config)
        .context("resolving endpoints (is CHECKOUT_BASE_URL set?)")?;
    let page = Rc::new(page);

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let controller = CheckoutController::try_new(config, Rc::new(client), page.clone())?;
            controller.init();

            if let Some(trigger) = &page.trigger {
                trigger.click();
            }
            page.settle().await;
            anyhow::Ok(())
        })
        .await?;

    match page.navigator.last() {
        Some(url) => {
            tracing::info!(url = %url, "Checkout left the page");
            Ok(())
        }
        None => anyhow::bail!("checkout did not complete"),
    }
}

/// Fail before any request when an endpoint cannot become a URL
fn check_endpoints(
    client: &HttpCommandClient,
    config: &CheckoutConfig,
) -> checkout_core::Result<()> {
    for endpoint in [
        &config.create_session_url,
        &config.create_order_url,
        &config.capture_order_url_template,
        &config.confirmation_url,
    ] {
        client.resolve(endpoint)?;
    }
    Ok(())
}
