#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use rentals_portal::{
    AppState, MockPasswordHasher, PermissionMatrix,
    config::AppConfig,
    crypto::HasherState,
    models::{Apartment, ApartmentFilter, NewApartmentRequest, UpdateApartmentRequest, User},
    repository::{RepoError, Repository, RepositoryState},
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

// --- Mock Repository ---

/// In-memory `Repository` implementation backing the integration tests.
/// Password hashes are stored as plaintext and paired with
/// `MockPasswordHasher`, which compares them verbatim.
#[derive(Default)]
pub struct MockRepo {
    users: Mutex<Vec<User>>,
    apartments: Mutex<Vec<Apartment>>,
}

impl MockRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the three canonical accounts: admin/admin, realtor/realtor,
    /// client/client.
    pub fn with_default_users() -> Self {
        let repo = Self::new();
        repo.seed_user("admin", "admin", "admin");
        repo.seed_user("realtor", "realtor", "realtor");
        repo.seed_user("client", "client", "client");
        repo
    }

    pub fn seed_user(&self, username: &str, password: &str, role: &str) -> User {
        let mut users = self.users.lock().unwrap();
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            username: username.to_string(),
            role: role.to_string(),
            password_hash: password.to_string(),
        };
        users.push(user.clone());
        user
    }

    pub fn seed_apartment(&self, name: &str, realtor_id: i64) -> Apartment {
        let mut apartments = self.apartments.lock().unwrap();
        let id = apartments.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let apartment = Apartment {
            id,
            name: name.to_string(),
            description: "desc".to_string(),
            realtor_id,
            floor_area_meters: 50.0,
            price_per_month_usd: 500.0,
            room_count: 4,
            latitude: 41.761536,
            longitude: 12.315237,
            available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        apartments.push(apartment.clone());
        apartment
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get_user(&self, id: i64) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    async fn list_users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<Option<User>, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == username) {
            return Ok(None);
        }
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            username: username.to_string(),
            role: role.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        Ok(Some(user))
    }

    async fn update_user(
        &self,
        id: i64,
        password_hash: Option<String>,
        role: Option<String>,
    ) -> Option<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.id == id)?;
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = role {
            user.role = role;
        }
        Some(user.clone())
    }

    async fn delete_user(&self, id: i64) -> bool {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        users.len() < before
    }

    async fn list_apartments(&self, filter: ApartmentFilter) -> Vec<Apartment> {
        self.apartments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                filter
                    .floor_area_meters
                    .is_none_or(|v| a.floor_area_meters == v)
                    && filter
                        .price_per_month_usd
                        .is_none_or(|v| a.price_per_month_usd == v)
                    && filter.room_count.is_none_or(|v| a.room_count == v)
            })
            .cloned()
            .collect()
    }

    async fn get_apartment(&self, id: i64) -> Option<Apartment> {
        self.apartments
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    async fn create_apartment(&self, req: NewApartmentRequest) -> Option<Apartment> {
        let mut apartments = self.apartments.lock().unwrap();
        let id = apartments.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let apartment = Apartment {
            id,
            name: req.name,
            description: req.description,
            realtor_id: req.realtor_id,
            floor_area_meters: req.floor_area_meters,
            price_per_month_usd: req.price_per_month_usd,
            room_count: req.room_count,
            latitude: req.latitude,
            longitude: req.longitude,
            available: req.available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        apartments.push(apartment.clone());
        Some(apartment)
    }

    async fn update_apartment(&self, id: i64, req: UpdateApartmentRequest) -> Option<Apartment> {
        let mut apartments = self.apartments.lock().unwrap();
        let apartment = apartments.iter_mut().find(|a| a.id == id)?;
        if let Some(name) = req.name {
            apartment.name = name;
        }
        if let Some(description) = req.description {
            apartment.description = description;
        }
        if let Some(v) = req.floor_area_meters {
            apartment.floor_area_meters = v;
        }
        if let Some(v) = req.price_per_month_usd {
            apartment.price_per_month_usd = v;
        }
        if let Some(v) = req.room_count {
            apartment.room_count = v;
        }
        if let Some(v) = req.latitude {
            apartment.latitude = v;
        }
        if let Some(v) = req.longitude {
            apartment.longitude = v;
        }
        if let Some(v) = req.available {
            apartment.available = v;
        }
        apartment.updated_at = Utc::now();
        Some(apartment.clone())
    }

    async fn delete_apartment(&self, id: i64) -> bool {
        let mut apartments = self.apartments.lock().unwrap();
        let before = apartments.len();
        apartments.retain(|a| a.id != id);
        apartments.len() < before
    }
}

// --- Dead-store repository ---

/// `Repository` implementation standing in for an unreachable database:
/// every fallible call reports a connection failure and every lookup comes
/// back empty.
pub struct DeadRepo;

impl DeadRepo {
    fn refused() -> RepoError {
        RepoError::Database("connection refused".to_string())
    }
}

#[async_trait]
impl Repository for DeadRepo {
    async fn find_user_by_username(&self, _username: &str) -> Result<Option<User>, RepoError> {
        Err(Self::refused())
    }

    async fn get_user(&self, _id: i64) -> Option<User> {
        None
    }

    async fn list_users(&self) -> Vec<User> {
        vec![]
    }

    async fn create_user(
        &self,
        _username: &str,
        _password_hash: &str,
        _role: &str,
    ) -> Result<Option<User>, RepoError> {
        Err(Self::refused())
    }

    async fn update_user(
        &self,
        _id: i64,
        _password_hash: Option<String>,
        _role: Option<String>,
    ) -> Option<User> {
        None
    }

    async fn delete_user(&self, _id: i64) -> bool {
        false
    }

    async fn list_apartments(&self, _filter: ApartmentFilter) -> Vec<Apartment> {
        vec![]
    }

    async fn get_apartment(&self, _id: i64) -> Option<Apartment> {
        None
    }

    async fn create_apartment(&self, _req: NewApartmentRequest) -> Option<Apartment> {
        None
    }

    async fn update_apartment(&self, _id: i64, _req: UpdateApartmentRequest) -> Option<Apartment> {
        None
    }

    async fn delete_apartment(&self, _id: i64) -> bool {
        false
    }
}

/// Builds an `AppState` over the dead-store repository; otherwise identical
/// to `mock_state`.
pub fn dead_state() -> AppState {
    let repo = Arc::new(DeadRepo) as RepositoryState;
    let hasher = Arc::new(MockPasswordHasher::new()) as HasherState;
    AppState::new(repo, hasher, PermissionMatrix::with_defaults(), AppConfig::default())
}

// --- App scaffolding ---

/// Builds an `AppState` over the given mock repository with the mock hasher,
/// the default permission table, and the default (test) config.
pub fn mock_state(repo: MockRepo) -> AppState {
    let repo = Arc::new(repo) as RepositoryState;
    let hasher = Arc::new(MockPasswordHasher::new()) as HasherState;
    AppState::new(repo, hasher, PermissionMatrix::with_defaults(), AppConfig::default())
}

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Spawns the full router on an ephemeral port and returns its base URL.
pub async fn spawn_app(state: AppState) -> TestApp {
    let router = rentals_portal::create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

/// Logs in over HTTP and returns the issued token.
pub async fn login(client: &reqwest::Client, address: &str, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/login", address))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(response.status(), 200, "login should succeed");

    let body: serde_json::Value = response.json().await.unwrap();
    body["token"].as_str().expect("token missing").to_string()
}
