use axum::{Router, http::HeaderName, middleware};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod crypto;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod rbac;
pub mod repository;

// Module for routing segregation (Public vs. gate-protected).
pub mod routes;
use routes::{protected, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the entry point and tests.
pub use auth::{AuthState, Authenticator, Identity};
pub use config::AppConfig;
pub use crypto::{Argon2Hasher, HasherState, MockPasswordHasher};
pub use rbac::PermissionMatrix;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) by aggregating all
/// handler paths and schemas decorated with the utoipa macros. Served at
/// `/api-docs/openapi.json`, browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::register_client, handlers::get_profile,
        handlers::list_users, handlers::get_user, handlers::create_user,
        handlers::update_user, handlers::delete_user,
        handlers::list_apartments, handlers::get_apartment, handlers::create_apartment,
        handlers::update_apartment, handlers::delete_apartment,
    ),
    components(
        schemas(
            models::User, models::Apartment, models::LoginRequest, models::TokenResponse,
            models::ProfileResponse, models::NewUserRequest, models::UpdateUserRequest,
            models::NewApartmentRequest, models::UpdateApartmentRequest, models::ErrorBody,
        )
    ),
    tags(
        (name = "rentals", description = "Rental listings API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding all application services and
/// configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts database access.
    pub repo: RepositoryState,
    /// Token authenticator: login issuance and per-request verification.
    pub auth: AuthState,
    /// Password hashing collaborator, used by the user-creation handlers.
    pub hasher: HasherState,
    /// Role → resource → operation grants. Immutable after construction;
    /// read by the gate on every request without locking.
    pub matrix: Arc<PermissionMatrix>,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Assembles the state from its collaborators, wiring the authenticator
    /// to the same repository and hasher the handlers use.
    pub fn new(
        repo: RepositoryState,
        hasher: HasherState,
        matrix: PermissionMatrix,
        config: AppConfig,
    ) -> Self {
        let auth = Arc::new(Authenticator::new(repo.clone(), hasher.clone()));
        Self {
            repo,
            auth,
            hasher,
            matrix: Arc::new(matrix),
            config,
        }
    }
}

/// create_router
///
/// Assembles the routing structure, applies the access gate and the
/// observability layers, and registers the application state.
///
/// The gate is layered over the whole router — fallback included — so an
/// unknown path still demands authentication before it can 404. Which paths
/// bypass the gate is decided inside the gate itself via its public
/// allow-list, never by route placement.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(protected::protected_routes())
        .with_state(state.clone())
        // Every request passes through exactly one gate evaluation before
        // any handler runs.
        .layer(middleware::from_fn_with_state(state, gate::access_gate));

    // 3. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID per request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle
                // in a span carrying the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the `TraceLayer` span: includes the `x-request-id` header (if
/// present) alongside the HTTP method and URI, so every log line for a single
/// request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
