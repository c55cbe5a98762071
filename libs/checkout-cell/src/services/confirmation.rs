// libs/checkout-cell/src/services/confirmation.rs
use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::PortalConfig;

use crate::error::CheckoutError;
use crate::models::{ConfirmAppointmentRequest, ConfirmAppointmentResponse};

/// Client for the appointment-confirmation endpoint that flips a cart
/// session into a booked consultation.
pub struct AppointmentConfirmationClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AppointmentConfirmationClient {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.portal_api_url.clone(),
            api_key: config.portal_api_key.clone(),
        }
    }

    pub async fn confirm(
        &self,
        request: &ConfirmAppointmentRequest,
    ) -> Result<ConfirmAppointmentResponse, CheckoutError> {
        let url = format!("{}/api/consultation/cart/confirm", self.base_url);
        debug!(
            "Confirming appointment for case {} (cart {})",
            request.case_lead_id, request.cart_unique_id
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Appointment confirmation failed ({}): {}", status, error_text);
            return Err(CheckoutError::ConfirmationFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let confirmed: ConfirmAppointmentResponse = response.json().await?;
        info!(
            "Appointment confirmed: details id {:?}",
            confirmed.consultation_case_appointment_details_id
        );
        Ok(confirmed)
    }
}
