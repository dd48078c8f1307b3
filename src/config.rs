use std::env;

use anyhow::Context;
use secrecy::SecretString;

const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: SecretString,
    pub jwt_ttl_hours: i64,
    /// Public URL of the web app, used for checkout and portal return links.
    pub app_base_url: String,
    pub invitation_ttl_days: i64,
    pub stripe: Option<StripeConfig>,
}

/// Payment processor settings. Billing stays disabled unless the secret key
/// and both plan prices are present.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: SecretString,
    pub webhook_secret: Option<SecretString>,
    pub price_monthly: String,
    pub price_yearly: String,
    pub api_base: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let app_base_url = env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", 24),
            app_base_url,
            invitation_ttl_days: parse_or("INVITATION_TTL_DAYS", 7),
            stripe: StripeConfig::from_env(),
        })
    }
}

impl StripeConfig {
    fn from_env() -> Option<Self> {
        let secret_key = non_empty("STRIPE_SECRET_KEY")?;
        let price_monthly = non_empty("STRIPE_PRICE_MONTHLY")?;
        let price_yearly = non_empty("STRIPE_PRICE_YEARLY")?;
        Some(Self {
            secret_key: SecretString::from(secret_key),
            webhook_secret: non_empty("STRIPE_WEBHOOK_SECRET").map(SecretString::from),
            price_monthly,
            price_yearly,
            api_base: non_empty("STRIPE_API_BASE")
                .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
