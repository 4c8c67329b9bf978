//! Payment gateway configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Gateway API base URL
    pub base_url: String,

    /// Merchant account id
    pub merchant_id: String,

    /// OAuth client id for token issuance
    pub client_id: String,

    /// OAuth client secret for token issuance
    pub client_secret: String,

    /// Webhook signing secret
    pub webhook_secret: String,

    /// Page the callback redirects to after a verified payment
    pub success_redirect_url: String,

    /// Page the callback redirects to on any failure
    pub failure_redirect_url: String,

    /// Default currency for checkouts
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl GatewayConfig {
    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidGatewayUrl);
        }
        if self.merchant_id.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_MERCHANT_ID"));
        }
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_CLIENT_ID"));
        }
        if self.client_secret.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_CLIENT_SECRET"));
        }
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_WEBHOOK_SECRET"));
        }
        if self.success_redirect_url.is_empty() || self.failure_redirect_url.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_REDIRECT_URLS"));
        }
        Ok(())
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        GatewayConfig {
            base_url: "https://api.gateway.test".to_string(),
            merchant_id: "mrc_123".to_string(),
            client_id: "client_abc".to_string(),
            client_secret: "secret_xyz".to_string(),
            webhook_secret: "whk_test".to_string(),
            success_redirect_url: "https://app.test/billing/success".to_string(),
            failure_redirect_url: "https://app.test/billing/failure".to_string(),
            currency: default_currency(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_default_currency_is_usd() {
        assert_eq!(valid_config().currency, "USD");
    }

    #[test]
    fn test_non_http_base_url_is_invalid() {
        let config = GatewayConfig {
            base_url: "ftp://gateway.test".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidGatewayUrl)
        ));
    }

    #[test]
    fn test_missing_webhook_secret_is_invalid() {
        let config = GatewayConfig {
            webhook_secret: String::new(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_redirect_urls_are_invalid() {
        let config = GatewayConfig {
            failure_redirect_url: String::new(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credentials_are_invalid() {
        let config = GatewayConfig {
            client_secret: String::new(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }
}
