//! Coinflow HTTP API service.
//!
//! This crate provides the HTTP surface for the coin purchase flow:
//!
//! - `GET /api/ping` - liveness probe
//! - `POST /api/purchase-coins` - create a Stripe payment intent for a
//!   coin purchase
//! - `POST /webhook` - signed Stripe webhooks; verified
//!   `payment_intent.succeeded` events credit the user's wallet
//!
//! The service is stateless between intent creation and webhook receipt:
//! the user id and amount ride in the payment intent's metadata, and the
//! webhook path recovers them from there. Credits are queued durably before
//! the webhook is acknowledged and applied by the outbox worker, idempotent
//! on the processor event id.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router's sake

pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod stripe;
pub mod worker;

pub use config::{ConfigError, ServiceConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use stripe::{StripeClient, StripeError};
