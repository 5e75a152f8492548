use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    models::ErrorBody,
    rbac::{Operation, Resource},
};

// --- Public allow-list ---

/// Paths that bypass the gate entirely: login, client self-registration, the
/// liveness probe, and the generated API documentation.
const PUBLIC_PATHS: [&str; 3] = ["/login", "/newClient", "/health"];
const PUBLIC_PREFIXES: [&str; 2] = ["/swagger-ui", "/api-docs"];

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

// --- Resource/Operation Classifier ---

/// Classification
///
/// What a request is trying to do, derived purely from its URL path and HTTP
/// verb. `resource: None` means the path matches no protected prefix — the
/// gate then requires authentication only. `operation: None` means the verb
/// is outside the CRUD table and authorization must fail closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub resource: Option<Resource>,
    pub operation: Option<Operation>,
}

/// classify
///
/// Pure, stateless mapping of (path, verb) to (resource, operation).
/// The resource is the longest matching protected prefix; the verb table is
/// POST/GET/PATCH/DELETE, case-insensitive.
pub fn classify(path: &str, method: &str) -> Classification {
    let resource = Resource::all()
        .into_iter()
        .filter(|r| path.starts_with(r.prefix()))
        .max_by_key(|r| r.prefix().len());

    let operation = match method.to_ascii_uppercase().as_str() {
        "POST" => Some(Operation::Create),
        "GET" => Some(Operation::Read),
        "PATCH" => Some(Operation::Update),
        "DELETE" => Some(Operation::Delete),
        _ => None,
    };

    Classification {
        resource,
        operation,
    }
}

// --- Rejection helpers ---

/// The one rejection body the gate ever sends. 401 and 403 responses are
/// shape-identical so a caller learns nothing beyond "not allowed".
fn reject(status: StatusCode) -> Response {
    (status, Json(ErrorBody::not_allowed())).into_response()
}

// --- Access Gate ---

/// access_gate
///
/// Middleware in front of every route. Per request:
/// 1. public paths are forwarded untouched;
/// 2. the `Authorization` header is resolved to an identity via the token
///    table — missing header, empty value and unknown token all reject with
///    401 identically;
/// 3. the request is classified into (resource, operation);
/// 4. if a protected resource was matched, the permission matrix must
///    explicitly allow (role, resource, operation), otherwise 403. A verb
///    outside the CRUD table never passes. Paths matching no resource only
///    require authentication;
/// 5. the identity is attached to the request extensions and the request is
///    forwarded.
///
/// Handlers behind the gate never re-check authorization.
pub async fn access_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if is_public(&path) {
        return next.run(request).await;
    }

    // The header value is the token itself; a "Bearer " prefix is
    // tolerated for conventional clients.
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value))
        .unwrap_or("");

    let identity = match state.auth.verify(token) {
        Some(identity) => identity,
        None => return reject(StatusCode::UNAUTHORIZED),
    };

    let classification = classify(&path, request.method().as_str());
    if let Some(resource) = classification.resource {
        let allowed = classification
            .operation
            .is_some_and(|op| state.matrix.allowed(identity.role, resource, op));

        if !allowed {
            tracing::debug!(
                user_id = identity.id,
                role = %identity.role,
                resource = %resource,
                method = %request.method(),
                "request denied by permission matrix"
            );
            return reject(StatusCode::FORBIDDEN);
        }
    }

    request.extensions_mut().insert(identity);
    next.run(request).await
}
