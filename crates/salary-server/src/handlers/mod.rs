//! HTTP route handlers for the prediction server.

pub mod prediction;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
