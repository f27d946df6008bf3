use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Public base URL of this API
    pub api_base_url: String,
    /// HMAC secret for signing access tokens
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    pub paypal_client_id: Option<String>,
    pub paypal_client_secret: Option<String>,
    /// `live` or `sandbox`
    pub paypal_environment: String,
    /// Webhook id registered with PayPal, needed to verify webhook signatures
    pub paypal_webhook_id: Option<String>,
    pub stripe_secret_key: Option<String>,
    /// Signing secret for Stripe webhooks (whsec_...)
    pub stripe_webhook_secret: Option<String>,
    /// Shown to buyers on the PayPal checkout page
    pub brand_name: String,
    /// Seed demo catalog data at startup
    pub seed_database: bool,
    /// Rate limit the login/registration routes per peer IP
    pub auth_rate_limit: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://boutique.sqlite?mode=rwc".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-jwt-secret-not-for-production".to_string()),
            jwt_expiration_minutes: env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1440),
            paypal_client_id: non_empty("PAYPAL_CLIENT_ID"),
            paypal_client_secret: non_empty("PAYPAL_CLIENT_SECRET"),
            paypal_environment: env::var("PAYPAL_ENVIRONMENT")
                .unwrap_or_else(|_| "sandbox".to_string()),
            paypal_webhook_id: non_empty("PAYPAL_WEBHOOK_ID"),
            stripe_secret_key: non_empty("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: non_empty("STRIPE_WEBHOOK_SECRET"),
            brand_name: env::var("BRAND_NAME").unwrap_or_else(|_| "Jewelry Boutique".to_string()),
            seed_database: flag("SEED_DATABASE", false),
            auth_rate_limit: flag("AUTH_RATE_LIMIT", true),
        }
    }

    /// Check if PayPal credentials are configured
    pub fn paypal_enabled(&self) -> bool {
        self.paypal_client_id.is_some() && self.paypal_client_secret.is_some()
    }

    /// Check if Stripe is configured
    pub fn stripe_enabled(&self) -> bool {
        self.stripe_secret_key.is_some()
    }

    pub fn paypal_base_url(&self) -> &'static str {
        if self.paypal_environment == "live" {
            "https://api-m.paypal.com"
        } else {
            "https://api-m.sandbox.paypal.com"
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
impl Config {
    /// Configuration used by tests: in-memory database, no providers, no rate limit
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            api_base_url: "http://localhost:8080".to_string(),
            jwt_secret: "test-jwt-secret".to_string(),
            jwt_expiration_minutes: 60,
            paypal_client_id: None,
            paypal_client_secret: None,
            paypal_environment: "sandbox".to_string(),
            paypal_webhook_id: None,
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            brand_name: "Test Boutique".to_string(),
            seed_database: false,
            auth_rate_limit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paypal_base_url_depends_on_environment() {
        let mut config = Config::for_tests();
        assert_eq!(config.paypal_base_url(), "https://api-m.sandbox.paypal.com");

        config.paypal_environment = "live".to_string();
        assert_eq!(config.paypal_base_url(), "https://api-m.paypal.com");
    }

    #[test]
    fn providers_disabled_without_credentials() {
        let mut config = Config::for_tests();
        assert!(!config.paypal_enabled());
        assert!(!config.stripe_enabled());

        config.paypal_client_id = Some("id".to_string());
        assert!(!config.paypal_enabled());
        config.paypal_client_secret = Some("secret".to_string());
        assert!(config.paypal_enabled());
    }
}
