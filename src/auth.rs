use axum::http::{StatusCode, request::Parts};
use axum::extract::FromRequestParts;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use uuid::Uuid;

use crate::{crypto::HasherState, rbac::Role, repository::RepositoryState};

/// Identity
///
/// The authenticated principal behind a verified token: the user's id and
/// role, nothing more. The access gate resolves it once per request and
/// attaches it to the request extensions; handlers read it through the
/// `FromRequestParts` extractor below and never re-run authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub role: Role,
}

/// Identity Extractor
///
/// Pulls the identity the access gate stored in the request extensions.
/// A missing identity means the handler was somehow reached without passing
/// the gate, which is rejected as 401 rather than treated as a server fault.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// AuthError
///
/// Failure modes of the login path. `InvalidCredentials` covers both an
/// unknown username and a wrong password — callers must not be able to tell
/// the two apart. `Internal` is reserved for genuine backend faults (an
/// unreachable user store, a stored role outside the closed set) and maps to
/// 500, never to 401.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("internal auth failure: {0}")]
    Internal(String),
}

/// TokenStore
///
/// The in-memory token → identity binding table. Owned by the
/// `Authenticator`, constructed at startup, dropped at shutdown; bindings do
/// not survive a restart (a documented limitation of the design, not a bug).
///
/// Concurrency: verification takes the read lock and runs concurrently with
/// other verifications; login takes the write lock only for the insert.
/// A single table-wide lock is deliberate — logins are rare relative to
/// verifications, so sharding would buy nothing.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: RwLock<HashMap<String, Identity>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, token: String, identity: Identity) {
        // Lock poisoning only happens if a writer panicked; propagating the
        // panic is the correct response.
        self.tokens
            .write()
            .expect("token store lock poisoned")
            .insert(token, identity);
    }

    fn lookup(&self, token: &str) -> Option<Identity> {
        self.tokens
            .read()
            .expect("token store lock poisoned")
            .get(token)
            .cloned()
    }
}

/// Authenticator
///
/// Issues and verifies opaque bearer tokens. Login authenticates credentials
/// against the user store and the password hasher, then mints a fresh v4-UUID
/// token bound to the user's identity. Verification is a pure table lookup —
/// no signature, no expiry.
pub struct Authenticator {
    repo: RepositoryState,
    hasher: HasherState,
    tokens: TokenStore,
    /// Hash of a throwaway password, verified on the unknown-username branch
    /// so that branch costs roughly the same as a real mismatch.
    dummy_hash: String,
}

/// AuthState
///
/// The concrete type used to share the authenticator across the application
/// state.
pub type AuthState = Arc<Authenticator>;

impl Authenticator {
    pub fn new(repo: RepositoryState, hasher: HasherState) -> Self {
        // Construction happens once at startup; a hasher that cannot hash is
        // unusable, so fail fast rather than run with an empty placeholder.
        let dummy_hash = hasher
            .hash("login-timing-placeholder")
            .expect("password hasher failed to produce the login-timing placeholder");
        Self {
            repo,
            hasher,
            tokens: TokenStore::new(),
            dummy_hash,
        }
    }

    /// login
    ///
    /// Authenticates a username/password pair and returns a fresh opaque
    /// token. Two successful logins for the same user yield two distinct
    /// tokens that both verify to the same identity.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = match self.repo.find_user_by_username(username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                // Unknown username: burn one verification anyway so the
                // response time matches the wrong-password case.
                let _ = self.hasher.verify(&self.dummy_hash, password);
                return Err(AuthError::InvalidCredentials);
            }
            // A store outage is not a bad login; let it surface as 500.
            Err(e) => return Err(AuthError::Internal(e.to_string())),
        };

        if !self.hasher.verify(&user.password_hash, password) {
            return Err(AuthError::InvalidCredentials);
        }

        // A role outside the closed set is corrupt data, not a bad login.
        let role = Role::from_str(&user.role).map_err(AuthError::Internal)?;

        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(
            token.clone(),
            Identity {
                id: user.id,
                role,
            },
        );

        tracing::info!(user_id = user.id, role = %role, "login succeeded");
        Ok(token)
    }

    /// verify
    ///
    /// Resolves a token to the identity it was bound to at login time.
    /// An unknown or malformed token is `None`, never an error.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        if token.is_empty() {
            return None;
        }
        self.tokens.lookup(token)
    }
}
