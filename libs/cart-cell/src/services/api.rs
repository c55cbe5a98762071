// libs/cart-cell/src/services/api.rs
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::PortalConfig;

use crate::error::CartError;
use crate::models::{CartItemRecord, ResponseEnvelope};

/// Client for the portal's consultation-cart endpoints.
pub struct CartApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CartApiClient {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.portal_api_url.clone(),
            api_key: config.portal_api_key.clone(),
        }
    }

    /// GET the authoritative appointment-cart contents for an employee's
    /// active cart session.
    pub async fn fetch_appointment_cart(
        &self,
        employee_ref_id: i64,
        cart_unique_id: i64,
    ) -> Result<Vec<CartItemRecord>, CartError> {
        let url = format!(
            "{}/api/consultation/cart?employeeRefId={}&cartUniqueId={}",
            self.base_url, employee_ref_id, cart_unique_id
        );
        debug!("Fetching appointment cart from {}", url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Cart fetch failed ({}): {}", status, error_text);
            return Err(CartError::FetchFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await?;
        let items = ResponseEnvelope::parse(body)?.into_items();

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            records.push(serde_json::from_value::<CartItemRecord>(item)?);
        }
        debug!("Fetched {} cart records", records.len());
        Ok(records)
    }
}
