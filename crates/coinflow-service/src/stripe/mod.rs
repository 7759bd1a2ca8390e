//! Stripe integration.
//!
//! Stripe handles:
//! - Payment intent creation for coin purchases
//! - Webhook delivery of payment lifecycle events

pub mod client;
pub mod types;

pub use client::{StripeClient, StripeError};
pub use types::{PaymentIntent, WebhookEvent, WebhookEventData};
