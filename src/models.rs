use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// A user record from the `users` table. The `role` column holds one of the
/// closed role set ("admin", "realtor", "client"); it is validated against
/// `rbac::Role` on every write path, so a stored value outside the set is a
/// data fault, not a request error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
    /// Argon2 PHC string. Never serialized into any response body.
    #[serde(skip)]
    #[ts(skip)]
    #[schema(ignore)]
    pub password_hash: String,
}

/// Apartment
///
/// A rental listing from the `apartments` table. Wire field names are
/// camelCase, with `pricePerMonthUSD` spelled exactly so for client
/// compatibility.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Apartment {
    pub id: i64,
    pub name: String,
    pub description: String,
    // FK to users.id; must reference an existing user at creation time.
    pub realtor_id: i64,
    pub floor_area_meters: f64,
    #[serde(rename = "pricePerMonthUSD")]
    pub price_per_month_usd: f64,
    pub room_count: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub available: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Credentials for POST /login. The password only transits to the hashing
/// collaborator and is never persisted or logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// TokenResponse
///
/// Output of a successful login: the opaque bearer token the client must
/// present in the `Authorization` header on every subsequent request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// ProfileResponse
///
/// Output of GET /profile: the identity resolved from the caller's token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProfileResponse {
    pub id: i64,
    pub role: String,
}

/// NewUserRequest
///
/// Input payload for POST /users (admin) and POST /newClient (public; the
/// handler overrides `role` to "client" regardless of what was sent).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: String,
}

/// UpdateUserRequest
///
/// Partial update payload for PATCH /users/{id}. Absent fields are left
/// untouched; a new password is re-hashed before storage.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// NewApartmentRequest
///
/// Input payload for POST /apartments.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewApartmentRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub realtor_id: i64,
    pub floor_area_meters: f64,
    #[serde(rename = "pricePerMonthUSD")]
    pub price_per_month_usd: f64,
    pub room_count: i32,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub available: bool,
}

impl NewApartmentRequest {
    /// Field-level validation applied before the row is inserted.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.floor_area_meters <= 0.0 {
            return Err("floorAreaMeters must be positive".to_string());
        }
        if self.price_per_month_usd <= 0.0 {
            return Err("pricePerMonthUSD must be positive".to_string());
        }
        if self.room_count <= 0 {
            return Err("roomCount must be positive".to_string());
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err("latitude out of range".to_string());
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err("longitude out of range".to_string());
        }
        Ok(())
    }
}

/// UpdateApartmentRequest
///
/// Partial update payload for PATCH /apartments/{id}. Only provided fields
/// change; the row id never does.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateApartmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_area_meters: Option<f64>,

    #[serde(rename = "pricePerMonthUSD", skip_serializing_if = "Option::is_none")]
    pub price_per_month_usd: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_count: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

/// ApartmentFilter
///
/// Accepted query parameters for GET /apartments. All filters are exact-match
/// and combine with AND.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::IntoParams, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentFilter {
    pub floor_area_meters: Option<f64>,
    #[serde(rename = "pricePerMonthUSD")]
    pub price_per_month_usd: Option<f64>,
    pub room_count: Option<i32>,
}

// --- Error Schema ---

/// ErrorBody
///
/// The generic JSON error payload. Authentication and authorization
/// rejections always use the same shape and the same message, so a response
/// never reveals whether a user exists or why access was denied.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn not_allowed() -> Self {
        Self {
            error: "Not allowed".to_string(),
        }
    }

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
