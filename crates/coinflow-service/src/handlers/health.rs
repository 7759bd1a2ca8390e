//! Liveness probe.

/// Liveness check endpoint; responds with a fixed literal.
pub async fn ping() -> &'static str {
    "pong"
}
