//! Liveness endpoint integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn ping_returns_pong() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/api/ping").await;

    response.assert_status_ok();
    response.assert_text("pong");
}
