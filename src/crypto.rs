use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;

/// PasswordHasher
///
/// Abstract contract for password hashing and verification. The
/// `Authenticator` and the user-creation handlers depend only on this trait,
/// so tests can substitute `MockPasswordHasher` for the real Argon2
/// implementation without touching any calling code.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password into a storable string.
    fn hash(&self, plaintext: &str) -> Result<String, String>;

    /// Checks a plaintext password against a stored hash.
    /// A malformed stored hash verifies as false, never as an error.
    fn verify(&self, hash: &str, plaintext: &str) -> bool;
}

/// HasherState
///
/// The concrete type used to share the hasher across the application state.
pub type HasherState = Arc<dyn PasswordHasher>;

/// Argon2Hasher
///
/// Production implementation backed by Argon2id with a per-password random
/// salt. The salt and parameters are embedded in the PHC hash string, so
/// `verify` needs no extra state.
#[derive(Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| e.to_string())
    }

    fn verify(&self, hash: &str, plaintext: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// MockPasswordHasher
///
/// Test double that treats the stored "hash" as the plaintext itself.
/// Lets integration tests seed users without paying the Argon2 cost.
#[derive(Clone, Default)]
pub struct MockPasswordHasher;

impl MockPasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for MockPasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, String> {
        Ok(plaintext.to_string())
    }

    fn verify(&self, hash: &str, plaintext: &str) -> bool {
        hash == plaintext
    }
}
