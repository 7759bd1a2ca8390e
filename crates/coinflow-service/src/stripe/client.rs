//! Stripe API client implementation.

use reqwest::Client;
use std::time::Duration;

use crate::crypto::{constant_time_eq, hmac_sha256_hex};

use super::types::{PaymentIntent, StripeErrorResponse};

/// Error type for Stripe operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe API returned an error.
    #[error("Stripe API error: {error_type} - {message}")]
    Api {
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Invalid webhook signature.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// The signature header was missing its timestamp or candidates.
    #[error("malformed signature header")]
    MalformedSignatureHeader,
}

/// Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_key: String,
    webhook_secret: String,
    base_url: String,
}

impl StripeClient {
    /// Stripe API base URL.
    const BASE_URL: &'static str = "https://api.stripe.com/v1";

    /// Create a new Stripe client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    /// * `webhook_secret` - Webhook signing secret (`whsec_...`)
    #[must_use]
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self::with_base_url(api_key, webhook_secret, Self::BASE_URL)
    }

    /// Create a client against a different API host.
    ///
    /// Integration tests use this to talk to a mock server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn with_base_url(
        api_key: impl Into<String>,
        webhook_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            webhook_secret: webhook_secret.into(),
            base_url: base_url.into(),
        }
    }

    /// Create a payment intent for a coin purchase.
    ///
    /// The user id and major-unit amount ride in the intent metadata (as
    /// strings, the metadata store's value type) so the webhook path can
    /// recover them without a local lookup.
    ///
    /// # Arguments
    ///
    /// * `amount_cents` - Amount to charge in cents
    /// * `user_id` - The purchasing user, stored as `metadata[userId]`
    /// * `amount` - Purchase amount in dollars, stored as `metadata[amount]`
    pub async fn create_payment_intent(
        &self,
        amount_cents: i64,
        user_id: &str,
        amount: i64,
    ) -> Result<PaymentIntent, StripeError> {
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", "usd".to_string()),
            ("metadata[userId]", user_id.to_string()),
            ("metadata[amount]", amount.to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Verify a webhook signature against the raw payload.
    ///
    /// # Arguments
    ///
    /// * `payload` - Raw request body, byte for byte as delivered
    /// * `signature` - Value of the `stripe-signature` header
    ///   (`t=timestamp,v1=signature,...`)
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be parsed or no `v1` candidate
    /// matches the expected signature.
    pub fn verify_webhook_signature(
        &self,
        payload: &str,
        signature: &str,
    ) -> Result<(), StripeError> {
        let mut timestamp: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in signature.split(',') {
            let mut kv = part.splitn(2, '=');
            match (kv.next(), kv.next()) {
                (Some("t"), Some(ts)) => timestamp = Some(ts),
                (Some("v1"), Some(sig)) => signatures.push(sig),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(StripeError::MalformedSignatureHeader)?;

        if signatures.is_empty() {
            return Err(StripeError::MalformedSignatureHeader);
        }

        // The signed payload is the timestamp and the raw body, dot-joined.
        let signed_payload = format!("{timestamp}.{payload}");
        let expected = hmac_sha256_hex(&self.webhook_secret, &signed_payload);

        let valid = signatures.iter().any(|sig| constant_time_eq(&expected, sig));

        if valid {
            Ok(())
        } else {
            Err(StripeError::InvalidSignature)
        }
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<StripeErrorResponse, _> = response.json().await;

        match error_body {
            Ok(stripe_error) => Err(StripeError::Api {
                error_type: stripe_error.error.error_type,
                message: stripe_error.error.message,
                code: stripe_error.error.code,
            }),
            Err(_) => Err(StripeError::Api {
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StripeClient {
        StripeClient::new("sk_test_xxx", "whsec_test")
    }

    fn signed_header(secret: &str, timestamp: &str, payload: &str) -> String {
        let signature = hmac_sha256_hex(secret, &format!("{timestamp}.{payload}"));
        format!("t={timestamp},v1={signature}")
    }

    #[test]
    fn valid_signature_verifies() {
        let payload = r#"{"id":"evt_test","type":"payment_intent.succeeded"}"#;
        let header = signed_header("whsec_test", "1700000000", payload);

        assert!(client().verify_webhook_signature(payload, &header).is_ok());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let payload = r#"{"id":"evt_test","type":"payment_intent.succeeded"}"#;
        let header = signed_header("whsec_test", "1700000000", payload);

        let result = client().verify_webhook_signature(r#"{"id":"evt_other"}"#, &header);
        assert!(matches!(result, Err(StripeError::InvalidSignature)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = r#"{"id":"evt_test"}"#;
        let header = signed_header("whsec_other", "1700000000", payload);

        let result = client().verify_webhook_signature(payload, &header);
        assert!(matches!(result, Err(StripeError::InvalidSignature)));
    }

    #[test]
    fn header_without_timestamp_is_rejected() {
        let result = client().verify_webhook_signature("{}", "v1=deadbeef");
        assert!(matches!(
            result,
            Err(StripeError::MalformedSignatureHeader)
        ));
    }

    #[test]
    fn header_without_candidates_is_rejected() {
        let result = client().verify_webhook_signature("{}", "t=1700000000");
        assert!(matches!(
            result,
            Err(StripeError::MalformedSignatureHeader)
        ));
    }

    #[test]
    fn any_matching_candidate_verifies() {
        let payload = r#"{"id":"evt_test"}"#;
        let signature = hmac_sha256_hex("whsec_test", &format!("1700000000.{payload}"));
        let header = format!("t=1700000000,v1=deadbeef,v1={signature}");

        assert!(client().verify_webhook_signature(payload, &header).is_ok());
    }
}
