use crate::error::AppError;
use bcrypt::{hash, verify};

/// Salts and hashes `password` with bcrypt at the given work factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::internal("Failed to hash password", e))
}

/// Compares a plaintext candidate against a stored bcrypt hash.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::internal("Failed to verify password", e))
}
