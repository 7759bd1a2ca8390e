//! Webhook endpoint integration tests.

mod common;

use std::time::Duration;

use common::{header, TestHarness};
use serde_json::json;

use coinflow_store::Store;

/// A `payment_intent.succeeded` event with correlation metadata.
fn succeeded_event(event_id: &str, user_id: &str, amount: serde_json::Value) -> String {
    json!({
        "id": event_id,
        "type": "payment_intent.succeeded",
        "data": {
            "object": {
                "id": "pi_test_123",
                "object": "payment_intent",
                "amount": 1000,
                "metadata": {"userId": user_id, "amount": amount}
            }
        }
    })
    .to_string()
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let harness = TestHarness::new().await;
    let payload = succeeded_event("evt_1", "u1", json!("10"));

    let response = harness.server.post("/webhook").text(payload).await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "invalid_signature");
}

#[tokio::test]
async fn invalid_signature_is_rejected_without_credit() {
    let harness = TestHarness::new().await;
    let payload = succeeded_event("evt_1", "u1", json!("10"));
    let (name, value) = header("stripe-signature", "t=1700000000,v1=deadbeef");

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .text(payload)
        .await;

    response.assert_status_bad_request();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(harness.balance("u1"), None);
}

#[tokio::test]
async fn verified_payment_succeeded_credits_wallet() {
    let harness = TestHarness::new().await;
    let payload = succeeded_event("evt_credit_1", "u1", json!("10"));
    let (name, value) = header("stripe-signature", &TestHarness::sign(&payload));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .text(payload)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["received"], true);

    assert_eq!(harness.wait_for_balance("u1", 10).await, 10);

    let wallet = harness
        .store
        .get_wallet(&"u1".parse().unwrap())
        .unwrap()
        .unwrap();
    assert!(wallet.last_updated > chrono::DateTime::<chrono::Utc>::UNIX_EPOCH);
}

#[tokio::test]
async fn numeric_metadata_amount_is_accepted() {
    let harness = TestHarness::new().await;
    let payload = succeeded_event("evt_numeric", "u2", json!(25));
    let (name, value) = header("stripe-signature", &TestHarness::sign(&payload));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .text(payload)
        .await;

    response.assert_status_ok();
    assert_eq!(harness.wait_for_balance("u2", 25).await, 25);
}

#[tokio::test]
async fn redelivered_event_credits_once() {
    let harness = TestHarness::new().await;
    let user_id = format!("user-{}", uuid::Uuid::new_v4());
    let payload = succeeded_event("evt_redelivered", &user_id, json!("10"));

    for _ in 0..3 {
        let (name, value) = header("stripe-signature", &TestHarness::sign(&payload));
        let response = harness
            .server
            .post("/webhook")
            .add_header(name, value)
            .text(payload.clone())
            .await;
        response.assert_status_ok();
    }

    assert_eq!(harness.wait_for_balance(&user_id, 10).await, 10);

    // Give a late duplicate every chance to land before asserting.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(harness.balance(&user_id), Some(10));

    let receipt = harness
        .store
        .get_receipt(&"evt_redelivered".parse().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(receipt.amount, 10);
}

#[tokio::test]
async fn credits_from_distinct_events_accumulate() {
    let harness = TestHarness::new().await;

    for (event_id, amount) in [("evt_a", "10"), ("evt_b", "15")] {
        let payload = succeeded_event(event_id, "u1", json!(amount));
        let (name, value) = header("stripe-signature", &TestHarness::sign(&payload));
        let response = harness
            .server
            .post("/webhook")
            .add_header(name, value)
            .text(payload)
            .await;
        response.assert_status_ok();
    }

    assert_eq!(harness.wait_for_balance("u1", 25).await, 25);
}

#[tokio::test]
async fn other_event_types_are_acknowledged_without_side_effect() {
    let harness = TestHarness::new().await;
    let payload = json!({
        "id": "evt_other",
        "type": "payment_intent.created",
        "data": {
            "object": {
                "id": "pi_test_123",
                "metadata": {"userId": "u1", "amount": "10"}
            }
        }
    })
    .to_string();
    let (name, value) = header("stripe-signature", &TestHarness::sign(&payload));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .text(payload)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["received"], true);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(harness.balance("u1"), None);
}

#[tokio::test]
async fn succeeded_event_without_metadata_is_rejected() {
    let harness = TestHarness::new().await;
    let payload = json!({
        "id": "evt_no_meta",
        "type": "payment_intent.succeeded",
        "data": {"object": {"id": "pi_test_123"}}
    })
    .to_string();
    let (name, value) = header("stripe-signature", &TestHarness::sign(&payload));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .text(payload)
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "invalid_request");
}

#[tokio::test]
async fn malformed_payload_with_valid_signature_is_rejected() {
    let harness = TestHarness::new().await;
    let payload = "not json at all";
    let (name, value) = header("stripe-signature", &TestHarness::sign(payload));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .text(payload)
        .await;

    response.assert_status_bad_request();
}
