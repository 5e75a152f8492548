use crate::models::{
    Apartment, ApartmentFilter, NewApartmentRequest, UpdateApartmentRequest, User,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use thiserror::Error;

/// RepoError
///
/// A backend fault: dead connection, failed query, constraint machinery gone
/// wrong. "Row not found" and "duplicate username" are domain answers and
/// stay in the `Option` channel; this type is only for faults the caller
/// must report as a server error, never as a client mistake.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        RepoError::Database(e.to_string())
    }
}

/// Repository Trait
///
/// Abstract contract for all persistence operations. Handlers and the
/// authenticator depend on this trait rather than a concrete driver, so tests
/// substitute in-memory mocks and the gate logic can be exercised without a
/// database.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    /// Lookup used by the login path. `Ok(None)` for an unknown username;
    /// `Err` when the store itself is unreachable, so the authenticator can
    /// answer 500 instead of treating the outage as bad credentials.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    async fn get_user(&self, id: i64) -> Option<User>;
    async fn list_users(&self) -> Vec<User>;
    /// Inserts a user with an already-hashed password. `Ok(None)` when the
    /// username is already taken; `Err` on a backend fault.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<Option<User>, RepoError>;
    /// Partial update: only provided fields change.
    async fn update_user(
        &self,
        id: i64,
        password_hash: Option<String>,
        role: Option<String>,
    ) -> Option<User>;
    /// Returns true if a row was deleted.
    async fn delete_user(&self, id: i64) -> bool;

    // --- Apartments ---
    async fn list_apartments(&self, filter: ApartmentFilter) -> Vec<Apartment>;
    async fn get_apartment(&self, id: i64) -> Option<Apartment>;
    async fn create_apartment(&self, req: NewApartmentRequest) -> Option<Apartment>;
    async fn update_apartment(&self, id: i64, req: UpdateApartmentRequest) -> Option<Apartment>;
    async fn delete_apartment(&self, id: i64) -> bool;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, role, password_hash";
const APARTMENT_COLUMNS: &str = "id, name, description, realtor_id, floor_area_meters, \
     price_per_month_usd, room_count, latitude, longitude, available, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("find_user_by_username error: {:?}", e);
            e.into()
        })
    }

    async fn get_user(&self, id: i64) -> Option<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn list_users(&self) -> Vec<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_users error: {:?}", e);
                vec![]
            })
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<Option<User>, RepoError> {
        match sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        {
            Ok(user) => Ok(Some(user)),
            // Unique-constraint violation on username is the caller's 400,
            // not a store fault.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tracing::warn!("create_user: username {:?} already taken", username);
                Ok(None)
            }
            Err(e) => {
                tracing::error!("create_user error: {:?}", e);
                Err(e.into())
            }
        }
    }

    /// update_user
    ///
    /// Uses `COALESCE` so only the provided fields change; `None` arguments
    /// leave the stored column untouched.
    async fn update_user(
        &self,
        id: i64,
        password_hash: Option<String>,
        role: Option<String>,
    ) -> Option<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET password_hash = COALESCE($2, password_hash), \
                 role = COALESCE($3, role) \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(password_hash)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_user error: {:?}", e);
            None
        })
    }

    async fn delete_user(&self, id: i64) -> bool {
        match sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_user error: {:?}", e);
                false
            }
        }
    }

    /// list_apartments
    ///
    /// Search endpoint: exact-match filters combined with AND, assembled with
    /// QueryBuilder so every value is bind-parameterized.
    async fn list_apartments(&self, filter: ApartmentFilter) -> Vec<Apartment> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {APARTMENT_COLUMNS} FROM apartments WHERE true"
        ));

        if let Some(area) = filter.floor_area_meters {
            builder.push(" AND floor_area_meters = ");
            builder.push_bind(area);
        }
        if let Some(price) = filter.price_per_month_usd {
            builder.push(" AND price_per_month_usd = ");
            builder.push_bind(price);
        }
        if let Some(rooms) = filter.room_count {
            builder.push(" AND room_count = ");
            builder.push_bind(rooms);
        }

        builder.push(" ORDER BY id");

        match builder.build_query_as::<Apartment>().fetch_all(&self.pool).await {
            Ok(apartments) => apartments,
            Err(e) => {
                tracing::error!("list_apartments error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_apartment(&self, id: i64) -> Option<Apartment> {
        sqlx::query_as::<_, Apartment>(&format!(
            "SELECT {APARTMENT_COLUMNS} FROM apartments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_apartment error: {:?}", e);
            None
        })
    }

    async fn create_apartment(&self, req: NewApartmentRequest) -> Option<Apartment> {
        sqlx::query_as::<_, Apartment>(&format!(
            "INSERT INTO apartments \
             (name, description, realtor_id, floor_area_meters, price_per_month_usd, \
              room_count, latitude, longitude, available, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW()) \
             RETURNING {APARTMENT_COLUMNS}"
        ))
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.realtor_id)
        .bind(req.floor_area_meters)
        .bind(req.price_per_month_usd)
        .bind(req.room_count)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.available)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_apartment error: {:?}", e);
            None
        })
    }

    /// update_apartment
    ///
    /// `COALESCE`-based partial update; the row id is never touched even if
    /// the client sends one.
    async fn update_apartment(&self, id: i64, req: UpdateApartmentRequest) -> Option<Apartment> {
        sqlx::query_as::<_, Apartment>(&format!(
            "UPDATE apartments \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 floor_area_meters = COALESCE($4, floor_area_meters), \
                 price_per_month_usd = COALESCE($5, price_per_month_usd), \
                 room_count = COALESCE($6, room_count), \
                 latitude = COALESCE($7, latitude), \
                 longitude = COALESCE($8, longitude), \
                 available = COALESCE($9, available), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {APARTMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(req.name)
        .bind(req.description)
        .bind(req.floor_area_meters)
        .bind(req.price_per_month_usd)
        .bind(req.room_count)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.available)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_apartment error: {:?}", e);
            None
        })
    }

    async fn delete_apartment(&self, id: i64) -> bool {
        match sqlx::query("DELETE FROM apartments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_apartment error: {:?}", e);
                false
            }
        }
    }
}
