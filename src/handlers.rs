use crate::{
    AppState,
    auth::{AuthError, Identity},
    models::{
        Apartment, ApartmentFilter, ErrorBody, LoginRequest, NewApartmentRequest, NewUserRequest,
        ProfileResponse, TokenResponse, UpdateApartmentRequest, UpdateUserRequest, User,
    },
    rbac::Role,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::str::FromStr;

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message)))
}

fn internal_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Internal server error")),
    )
}

// --- Session ---

/// login
///
/// [Public Route] Exchanges a username/password pair for an opaque bearer
/// token. Unknown username and wrong password produce the identical 401
/// response; only genuine backend faults surface as 500.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Backend fault", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    match state.auth.login(&payload.username, &payload.password).await {
        Ok(token) => Ok(Json(TokenResponse { token })),
        Err(AuthError::InvalidCredentials) => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::not_allowed()),
        )),
        Err(AuthError::Internal(reason)) => {
            tracing::error!("login internal failure: {}", reason);
            Err(internal_error())
        }
    }
}

/// get_profile
///
/// [Authenticated Route] Returns the identity resolved from the caller's
/// token. The path matches no protected resource prefix, so the gate only
/// requires authentication here.
#[utoipa::path(
    get,
    path = "/profile",
    responses((status = 200, description = "Caller identity", body = ProfileResponse))
)]
pub async fn get_profile(identity: Identity) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        id: identity.id,
        role: identity.role.to_string(),
    })
}

// --- User management (admin via permission matrix) ---

/// list_users
///
/// [Protected: users/Read] Lists all user accounts. Password hashes never
/// serialize.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.repo.list_users().await)
}

/// get_user
///
/// [Protected: users/Read] Retrieves a single user by id.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, StatusCode> {
    match state.repo.get_user(id).await {
        Some(user) => Ok(Json(user)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// create_user
///
/// [Protected: users/Create] Creates a user with an arbitrary role from the
/// closed set. The plaintext password is hashed before it reaches the
/// repository.
#[utoipa::path(
    post,
    path = "/users",
    request_body = NewUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 400, description = "Invalid role or duplicate username", body = ErrorBody),
        (status = 500, description = "Backend fault", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let role = Role::from_str(&payload.role).map_err(bad_request)?;
    store_user(&state, &payload.username, &payload.password, role).await
}

/// register_client
///
/// [Public Route] Self-service registration. Whatever role the payload
/// claims, the stored account is always a client.
#[utoipa::path(
    post,
    path = "/newClient",
    request_body = NewUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 400, description = "Duplicate username", body = ErrorBody),
        (status = 500, description = "Backend fault", body = ErrorBody)
    )
)]
pub async fn register_client(
    State(state): State<AppState>,
    Json(payload): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    store_user(&state, &payload.username, &payload.password, Role::Client).await
}

/// Shared insertion path for the admin and self-registration endpoints.
async fn store_user(
    state: &AppState,
    username: &str,
    password: &str,
    role: Role,
) -> Result<(StatusCode, Json<User>), ApiError> {
    if username.trim().is_empty() {
        return Err(bad_request("username must not be empty"));
    }
    let password_hash = state.hasher.hash(password).map_err(|e| {
        tracing::error!("password hashing failed: {}", e);
        internal_error()
    })?;

    match state
        .repo
        .create_user(username, &password_hash, role.as_str())
        .await
    {
        Ok(Some(user)) => Ok((StatusCode::CREATED, Json(user))),
        Ok(None) => Err(bad_request("could not create user")),
        // A store fault is the server's problem; the repository already
        // logged the cause.
        Err(_) => Err(internal_error()),
    }
}

/// update_user
///
/// [Protected: users/Update] Partial update of password and/or role. A new
/// password is re-hashed; a new role must be in the closed set.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let role = match payload.role {
        Some(role) => Some(Role::from_str(&role).map_err(bad_request)?.as_str().to_string()),
        None => None,
    };

    let password_hash = match payload.password {
        Some(password) => Some(state.hasher.hash(&password).map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            internal_error()
        })?),
        None => None,
    };

    match state.repo.update_user(id, password_hash, role).await {
        Some(user) => Ok(Json(user)),
        None => Err((StatusCode::NOT_FOUND, Json(ErrorBody::new("user not found")))),
    }
}

/// delete_user
///
/// [Protected: users/Delete]
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<i64>) -> StatusCode {
    if state.repo.delete_user(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// --- Apartment listings ---

/// list_apartments
///
/// [Protected: apartments/Read] Lists apartments, optionally filtered by
/// exact floor area, monthly price and room count.
#[utoipa::path(
    get,
    path = "/apartments",
    params(ApartmentFilter),
    responses((status = 200, description = "Matching apartments", body = [Apartment]))
)]
pub async fn list_apartments(
    State(state): State<AppState>,
    Query(filter): Query<ApartmentFilter>,
) -> Json<Vec<Apartment>> {
    Json(state.repo.list_apartments(filter).await)
}

/// get_apartment
///
/// [Protected: apartments/Read]
#[utoipa::path(
    get,
    path = "/apartments/{id}",
    params(("id" = i64, Path, description = "Apartment ID")),
    responses(
        (status = 200, description = "Found", body = Apartment),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_apartment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Apartment>, StatusCode> {
    match state.repo.get_apartment(id).await {
        Some(apartment) => Ok(Json(apartment)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// create_apartment
///
/// [Protected: apartments/Create] Validates the listing fields and checks
/// that the referenced realtor account exists before inserting.
#[utoipa::path(
    post,
    path = "/apartments",
    request_body = NewApartmentRequest,
    responses(
        (status = 201, description = "Created", body = Apartment),
        (status = 400, description = "Invalid listing", body = ErrorBody)
    )
)]
pub async fn create_apartment(
    State(state): State<AppState>,
    Json(payload): Json<NewApartmentRequest>,
) -> Result<(StatusCode, Json<Apartment>), ApiError> {
    payload.validate().map_err(bad_request)?;

    if state.repo.get_user(payload.realtor_id).await.is_none() {
        return Err(bad_request(format!(
            "realtor not found (id={})",
            payload.realtor_id
        )));
    }

    match state.repo.create_apartment(payload).await {
        Some(apartment) => Ok((StatusCode::CREATED, Json(apartment))),
        None => Err(internal_error()),
    }
}

/// update_apartment
///
/// [Protected: apartments/Update] Partial update; only provided fields
/// change, and the row id never does.
#[utoipa::path(
    patch,
    path = "/apartments/{id}",
    params(("id" = i64, Path, description = "Apartment ID")),
    request_body = UpdateApartmentRequest,
    responses(
        (status = 200, description = "Updated", body = Apartment),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_apartment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateApartmentRequest>,
) -> Result<Json<Apartment>, StatusCode> {
    match state.repo.update_apartment(id, payload).await {
        Some(apartment) => Ok(Json(apartment)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// delete_apartment
///
/// [Protected: apartments/Delete]
#[utoipa::path(
    delete,
    path = "/apartments/{id}",
    params(("id" = i64, Path, description = "Apartment ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_apartment(State(state): State<AppState>, Path(id): Path<i64>) -> StatusCode {
    if state.repo.delete_apartment(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
