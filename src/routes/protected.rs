use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Protected Router Module
///
/// Every route here sits behind the access gate. The gate authenticates the
/// caller and, for paths under `/users` and `/apartments`, checks the
/// permission matrix for (role, resource, operation) before the handler runs.
/// Handlers therefore carry no authorization logic of their own; the only
/// identity-aware one is `/profile`, which reads the resolved `Identity` from
/// the request extensions.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        // GET /profile
        // The caller's resolved identity. Authenticated-only; the path maps
        // to no protected resource, so no matrix check applies.
        .route("/profile", get(handlers::get_profile))
        // --- Users (admin-only via the permission matrix) ---
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // --- Apartments (realtor/admin write, client read) ---
        .route(
            "/apartments",
            get(handlers::list_apartments).post(handlers::create_apartment),
        )
        .route(
            "/apartments/{id}",
            get(handlers::get_apartment)
                .patch(handlers::update_apartment)
                .delete(handlers::delete_apartment),
        )
}
