//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Default listening port.
const DEFAULT_PORT: u16 = 5001;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required option was not provided by file or environment.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
}

/// Service configuration loaded from environment variables, with a secrets
/// file fallback for the Stripe credentials.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:5001", port from `PORT`).
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory (default: "/data/coinflow").
    pub data_dir: String,

    /// Stripe secret key (`sk_test_...` or `sk_live_...`).
    pub stripe_secret_key: String,

    /// Stripe webhook signing secret (`whsec_...`).
    pub stripe_webhook_secret: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Interval between outbox sweeps in seconds.
    pub outbox_sweep_seconds: u64,
}

/// Stripe secrets file structure.
#[derive(Debug, Deserialize)]
struct StripeSecrets {
    secret_key: String,
    #[serde(default)]
    webhook_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and the secrets file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when the Stripe secret key or webhook
    /// signing secret is available from neither source. The webhook secret
    /// is not optional: without it no delivery can be authenticated, and an
    /// unauthenticated delivery must never credit a wallet.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load Stripe secrets from file first, then fall back to env vars
        let (stripe_secret_key, stripe_webhook_secret) = load_stripe_secrets();

        let stripe_secret_key =
            stripe_secret_key.ok_or(ConfigError::Missing("STRIPE_SECRET_KEY"))?;
        let stripe_webhook_secret =
            stripe_webhook_secret.ok_or(ConfigError::Missing("STRIPE_WEBHOOK_SECRET"))?;

        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            listen_addr: format!("0.0.0.0:{port}"),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/coinflow".into()),
            stripe_secret_key,
            stripe_webhook_secret,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            outbox_sweep_seconds: std::env::var("OUTBOX_SWEEP_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        })
    }
}

/// Load Stripe secrets from file or environment.
fn load_stripe_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/stripe.json",
        "coinflow/.secrets/stripe.json",
        "../.secrets/stripe.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<StripeSecrets>(path) {
            tracing::info!(path = %path, "Loaded Stripe secrets from file");
            return (Some(secrets.secret_key), secrets.webhook_secret);
        }
    }

    // Fall back to environment variables
    tracing::debug!("Stripe secrets file not found, using environment variables");
    (
        std::env::var("STRIPE_SECRET_KEY").ok(),
        std::env::var("STRIPE_WEBHOOK_SECRET").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
