//! Core types for the coinflow service.
//!
//! This crate defines the plain data types shared by the storage layer and
//! the HTTP service:
//!
//! - Strongly-typed identifiers ([`UserId`], [`EventId`])
//! - The [`Wallet`] record held per user
//! - The [`PendingCredit`] outbox entry and [`CreditReceipt`] idempotency
//!   record used by the webhook credit pipeline
//!
//! No I/O happens here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod credit;
pub mod ids;
pub mod wallet;

pub use credit::{CreditReceipt, PendingCredit};
pub use ids::{EventId, IdError, UserId};
pub use wallet::Wallet;
