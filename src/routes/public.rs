use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints the access gate forwards unconditionally. Everything else in the
/// application requires at least a verified token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // Exchanges credentials for an opaque bearer token.
        .route("/login", post(handlers::login))
        // POST /newClient
        // Self-service registration; the created account is always a client.
        .route("/newClient", post(handlers::register_client))
}
