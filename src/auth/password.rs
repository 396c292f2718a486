use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
};
use rand::thread_rng;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::internal_with_source("Password hashing failed", err))?
        .to_string();
    Ok(hash)
}

/// A malformed stored hash verifies as `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("stored password hash could not be parsed");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, AppError>;
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, AppError> {
        hash_password(plain)
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        verify_password(plain, hash)
    }
}
