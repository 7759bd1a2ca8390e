//! Coin purchase handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use coinflow_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Highest accepted purchase amount in dollars.
const MAX_PURCHASE_DOLLARS: i64 = 1_000_000;

/// Cents per dollar when converting to the processor's minor units.
const CENTS_PER_DOLLAR: i64 = 100;

/// Purchase request body.
///
/// Both fields are optional at the serde boundary so an absent field is
/// reported with the documented message rather than an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct PurchaseCoinsRequest {
    /// Amount to purchase, in whole dollars.
    pub amount: Option<i64>,
    /// The purchasing user.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Purchase response.
#[derive(Debug, Serialize)]
pub struct PurchaseCoinsResponse {
    /// Opaque client secret of the created payment intent.
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

/// Create a payment intent for a coin purchase.
///
/// No wallet is touched here: the credit happens only when the processor
/// confirms the payment through the webhook.
pub async fn purchase_coins(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PurchaseCoinsRequest>,
) -> Result<Json<PurchaseCoinsResponse>, ApiError> {
    let amount = body.amount.filter(|a| *a != 0);
    let user_id = body.user_id.as_deref().filter(|s| !s.is_empty());

    let (Some(amount), Some(user_id)) = (amount, user_id) else {
        return Err(ApiError::InvalidRequest(
            "amount and userId are required".into(),
        ));
    };

    if !(1..=MAX_PURCHASE_DOLLARS).contains(&amount) {
        return Err(ApiError::InvalidRequest(format!(
            "amount must be between 1 and {MAX_PURCHASE_DOLLARS}"
        )));
    }

    let user_id: UserId = user_id
        .parse()
        .map_err(|e| ApiError::InvalidRequest(format!("userId: {e}")))?;

    let amount_cents = amount * CENTS_PER_DOLLAR;

    tracing::info!(
        user_id = %user_id,
        amount = %amount,
        amount_cents = %amount_cents,
        "Initiating coin purchase"
    );

    let intent = state
        .stripe
        .create_payment_intent(amount_cents, user_id.as_str(), amount)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create payment intent");
            ApiError::Processor(e.to_string())
        })?;

    let client_secret = intent
        .client_secret
        .ok_or_else(|| ApiError::Processor("Stripe returned no client secret".into()))?;

    tracing::info!(
        user_id = %user_id,
        intent_id = %intent.id,
        "Payment intent created"
    );

    Ok(Json(PurchaseCoinsResponse { client_secret }))
}
