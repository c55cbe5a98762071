// libs/checkout-cell/src/services/gateway.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use shared_config::PortalConfig;

use crate::error::GatewayError;
use crate::models::{GatewayOrder, GatewayOutcome};

/// The external payment collaborator. The orchestrator only sees this
/// seam: hand over an order, get back a payment reference or a dismiss.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn collect(&self, order: GatewayOrder) -> Result<GatewayOutcome, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct HostedCheckoutResponse {
    status: String,
    #[serde(default)]
    payment_id: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Hosted-checkout implementation: posts the order to the gateway and
/// waits for the hosted page's resolution. Constructing it without
/// gateway configuration fails up front, which blocks the paid path
/// while leaving free checkouts untouched.
#[derive(Debug)]
pub struct HostedPaymentGateway {
    client: Client,
    base_url: String,
    key_id: String,
}

impl HostedPaymentGateway {
    pub fn new(config: &PortalConfig) -> Result<Self, GatewayError> {
        if !config.is_gateway_configured() {
            return Err(GatewayError::Unavailable(
                "payment gateway is not configured".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            base_url: config.gateway_url.clone(),
            key_id: config.gateway_key_id.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for HostedPaymentGateway {
    async fn collect(&self, order: GatewayOrder) -> Result<GatewayOutcome, GatewayError> {
        let url = format!("{}/v1/checkout", self.base_url);
        debug!(
            "Submitting gateway order {} for {} {}",
            order.receipt, order.amount_minor, order.currency
        );

        let body = json!({
            "key_id": self.key_id,
            "amount": order.amount_minor,
            "currency": order.currency,
            "description": order.description,
            "receipt": order.receipt,
            "prefill": {
                "name": order.prefill_name,
                "email": order.prefill_email,
                "contact": order.prefill_phone,
            },
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gateway rejected order ({}): {}", status, error_text);
            if status.is_server_error() {
                return Err(GatewayError::Unavailable(format!(
                    "HTTP {}: {}",
                    status, error_text
                )));
            }
            return Err(GatewayError::Declined(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let resolution: HostedCheckoutResponse = response.json().await?;
        match resolution.status.as_str() {
            "captured" => {
                let payment_id = resolution.payment_id.ok_or_else(|| {
                    GatewayError::Declined("captured response without payment id".to_string())
                })?;
                info!("Gateway payment captured: {}", payment_id);
                Ok(GatewayOutcome::Completed { payment_id })
            }
            "dismissed" => {
                info!("Gateway checkout dismissed by user");
                Ok(GatewayOutcome::Dismissed)
            }
            other => Err(GatewayError::Declined(
                resolution
                    .error_description
                    .unwrap_or_else(|| format!("unexpected gateway status {}", other)),
            )),
        }
    }
}
