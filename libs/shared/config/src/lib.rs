use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub portal_api_url: String,
    pub portal_api_key: String,
    pub gateway_url: String,
    pub gateway_key_id: String,
    pub storage_dir: String,
    pub currency: String,
}

impl PortalConfig {
    pub fn from_env() -> Self {
        let config = Self {
            portal_api_url: env::var("PORTAL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_API_URL not set, using empty value");
                    String::new()
                }),
            portal_api_key: env::var("PORTAL_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_API_KEY not set, using empty value");
                    String::new()
                }),
            gateway_url: env::var("PAYMENT_GATEWAY_URL")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_GATEWAY_URL not set, using empty value");
                    String::new()
                }),
            gateway_key_id: env::var("PAYMENT_GATEWAY_KEY_ID")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_GATEWAY_KEY_ID not set, using empty value");
                    String::new()
                }),
            storage_dir: env::var("PORTAL_STORAGE_DIR")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_STORAGE_DIR not set, using default");
                    ".portal-cache".to_string()
                }),
            currency: env::var("PORTAL_CURRENCY")
                .unwrap_or_else(|_| "INR".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.portal_api_url.is_empty()
    }

    pub fn is_gateway_configured(&self) -> bool {
        !self.gateway_url.is_empty() && !self.gateway_key_id.is_empty()
    }
}
