//! Common test utilities for coinflow integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use wiremock::MockServer;

use coinflow_core::UserId;
use coinflow_service::crypto::hmac_sha256_hex;
use coinflow_service::{create_router, worker, AppState, ServiceConfig, StripeClient};
use coinflow_store::{RocksStore, Store};

/// Webhook signing secret used across tests.
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Test harness: in-process server, fresh store, mock Stripe API.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Mock Stripe API standing in for `api.stripe.com`.
    pub stripe: MockServer,
    /// Store handle for direct assertions.
    pub store: Arc<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// Outbox worker handle (kept alive for test duration).
    pub _worker: JoinHandle<()>,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and mock Stripe API.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));
        let stripe_mock = MockServer::start().await;

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            stripe_secret_key: "sk_test_key".into(),
            stripe_webhook_secret: WEBHOOK_SECRET.into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            outbox_sweep_seconds: 1,
        };

        let stripe = StripeClient::with_base_url("sk_test_key", WEBHOOK_SECRET, stripe_mock.uri());
        let state = AppState::with_stripe(Arc::clone(&store), config, stripe);

        let worker = worker::spawn(
            Arc::clone(&store),
            Arc::clone(&state.outbox),
            Duration::from_millis(50),
        );

        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            stripe: stripe_mock,
            store,
            _temp_dir: temp_dir,
            _worker: worker,
        }
    }

    /// Build a signed `stripe-signature` header value for a payload.
    pub fn sign(payload: &str) -> String {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = hmac_sha256_hex(WEBHOOK_SECRET, &format!("{timestamp}.{payload}"));
        format!("t={timestamp},v1={signature}")
    }

    /// Current balance for a user, or `None` if no wallet exists yet.
    pub fn balance(&self, user_id: &str) -> Option<i64> {
        let user_id: UserId = user_id.parse().expect("valid user id");
        self.store
            .get_wallet(&user_id)
            .expect("store read")
            .map(|w| w.balance)
    }

    /// Wait until the wallet balance reaches `expected`.
    ///
    /// Credits are applied by the outbox worker after the webhook response,
    /// so tests poll briefly instead of asserting immediately.
    pub async fn wait_for_balance(&self, user_id: &str, expected: i64) -> i64 {
        let mut last = 0;
        for _ in 0..100 {
            if let Some(balance) = self.balance(user_id) {
                last = balance;
                if balance >= expected {
                    return balance;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        last
    }
}

/// Header pair for `TestServer` requests.
pub fn header(name: &'static str, value: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(name),
        HeaderValue::from_str(value).expect("valid header value"),
    )
}
