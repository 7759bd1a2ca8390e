//! Stripe webhook handler.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use coinflow_core::{EventId, PendingCredit, UserId};
use coinflow_store::Store;

use crate::error::ApiError;
use crate::state::AppState;
use crate::stripe::WebhookEvent;

/// The one event type that triggers a wallet credit.
const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Webhook acknowledgement body.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the event was accepted.
    pub received: bool,
}

/// Handle a Stripe webhook delivery.
///
/// The body is taken raw: the signature covers the verbatim byte stream, so
/// this route must not go through the JSON extractor used elsewhere.
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::InvalidSignature)?;

    state
        .stripe
        .verify_webhook_signature(&body, signature)
        .map_err(|e| {
            tracing::warn!(error = %e, "Webhook signature verification failed");
            ApiError::InvalidSignature
        })?;

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| ApiError::InvalidRequest(format!("malformed webhook payload: {e}")))?;

    tracing::info!(
        event_id = %event.id,
        event_type = %event.event_type,
        "Received Stripe webhook"
    );

    if event.event_type == PAYMENT_SUCCEEDED {
        enqueue_credit(&state, &event)?;
    } else {
        tracing::debug!(event_type = %event.event_type, "Ignoring Stripe event");
    }

    Ok(Json(WebhookResponse { received: true }))
}

/// Queue the wallet credit for a succeeded payment.
///
/// The entry is durable before the acknowledgement goes out; the outbox
/// worker applies it. A failed write here turns into a 500, so the processor
/// redelivers instead of the credit being lost.
fn enqueue_credit(state: &AppState, event: &WebhookEvent) -> Result<(), ApiError> {
    let object = &event.data.object;

    let user_id: UserId = object
        .get("metadata")
        .and_then(|m| m.get("userId"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            ApiError::InvalidRequest("payment intent metadata is missing userId".into())
        })?
        .parse()
        .map_err(|e| ApiError::InvalidRequest(format!("invalid userId in metadata: {e}")))?;

    let amount = metadata_amount(object).ok_or_else(|| {
        ApiError::InvalidRequest("payment intent metadata is missing a valid amount".into())
    })?;

    let event_id: EventId = event
        .id
        .parse()
        .map_err(|e| ApiError::InvalidRequest(format!("invalid event id: {e}")))?;

    let credit = PendingCredit {
        event_id,
        user_id,
        amount,
        received_at: Utc::now(),
    };

    let queued = state.store.enqueue_credit(&credit)?;
    if queued {
        tracing::info!(
            event_id = %credit.event_id,
            user_id = %credit.user_id,
            amount = %amount,
            "Wallet credit queued"
        );
        state.outbox.notify_one();
    } else {
        tracing::info!(
            event_id = %credit.event_id,
            "Event already processed, ignoring redelivery"
        );
    }

    Ok(())
}

/// Extract the credit amount from intent metadata.
///
/// The canonical representation is a string (metadata values are strings),
/// but a bare number is accepted too since deliveries have been seen with
/// either shape. Non-positive amounts are treated as invalid.
fn metadata_amount(object: &serde_json::Value) -> Option<i64> {
    let amount = object.get("metadata")?.get("amount")?;

    match amount {
        serde_json::Value::String(s) => s.parse().ok(),
        other => other.as_i64(),
    }
    .filter(|a| *a > 0)
}
