//! Application state.

use std::sync::Arc;

use tokio::sync::Notify;

use coinflow_store::RocksStore;

use crate::config::ServiceConfig;
use crate::stripe::StripeClient;

/// Application state shared across handlers.
///
/// Both external clients are constructed once at startup and reused for
/// every request; nothing here is ambient or global.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Stripe client for payment intents and webhook verification.
    pub stripe: Arc<StripeClient>,

    /// Wakes the outbox worker after a credit is queued.
    pub outbox: Arc<Notify>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let stripe = StripeClient::new(&config.stripe_secret_key, &config.stripe_webhook_secret);
        Self::with_stripe(store, config, stripe)
    }

    /// Create application state around a preconstructed Stripe client.
    ///
    /// Integration tests use this to point the client at a mock API server.
    #[must_use]
    pub fn with_stripe(store: Arc<RocksStore>, config: ServiceConfig, stripe: StripeClient) -> Self {
        Self {
            store,
            config,
            stripe: Arc::new(stripe),
            outbox: Arc::new(Notify::new()),
        }
    }
}
