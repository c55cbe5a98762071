use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cart_cell::services::{ActivePage, CartService};
use checkout_cell::services::HostedPaymentGateway;
use shared_config::PortalConfig;
use shared_models::UserIdentity;
use shared_storage::FileStorage;

/// Headless cart sync runner: reconciles the locally cached carts with
/// the backend session and reports the badge totals. The interactive
/// screens embed the same cells.
#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portal cart sync");

    let config = PortalConfig::from_env();

    let identity = UserIdentity {
        employee_id: std::env::var("PORTAL_EMPLOYEE_ID")
            .ok()
            .and_then(|v| v.parse().ok()),
        ..UserIdentity::guest()
    };

    let backend = Arc::new(FileStorage::new(&config.storage_dir)?);
    let cart = CartService::new(&config, backend);

    match HostedPaymentGateway::new(&config) {
        Ok(_) => info!("Payment gateway configured; paid checkout available"),
        Err(e) => warn!("Paid checkout disabled: {}", e),
    }

    let owner = identity.owner_key();
    match cart.reconcile(&identity).await {
        Ok(outcome) => info!("Cart reconciliation finished: {:?}", outcome),
        Err(e) => warn!("Cart reconciliation degraded: {}", e),
    }

    let summary = cart.summary(&owner, ActivePage::Appointment);
    info!(
        "Cart badges for {}: pharmacy {} ({:.2}), appointments {} ({:.2}), diagnostics {} ({:.2})",
        owner,
        summary.pharmacy_count,
        summary.pharmacy_total,
        summary.appointment_count,
        summary.appointment_total,
        summary.diagnostic_count,
        summary.diagnostic_total,
    );

    Ok(())
}
