//! Credential and session token primitives
//!
//! # Passwords
//!
//! - Hashed with bcrypt at [`BCRYPT_COST`]; the salt and cost live inside the
//!   stored `$2b$...` string, so one column holds everything
//! - Accounts with an empty hash (the AI reviewer) never verify
//!
//! # Session tokens
//!
//! - Tokens are 32 random bytes, hex encoded (64 chars), handed to the client once
//! - Only `SHA-256(token)` is persisted, so a leaked sessions table cannot be replayed

use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::Result;

/// bcrypt work factor for stored passwords
pub const BCRYPT_COST: u32 = 12;

/// Session token length in bytes (before hex encoding)
const TOKEN_LEN: usize = 32;

/// Hash a password for storage
///
/// # Examples
///
/// ```
/// use lumora_common::api::auth::{hash_password, verify_password};
///
/// let stored = hash_password("hunter22").unwrap();
/// assert!(verify_password("hunter22", &stored));
/// assert!(!verify_password("hunter23", &stored));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, BCRYPT_COST)?)
}

/// Check `password` against a stored bcrypt hash
///
/// A malformed stored hash is logged and treated as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    if stored_hash.is_empty() {
        return false;
    }

    bcrypt::verify(password, stored_hash).unwrap_or_else(|e| {
        warn!(error = %e, "Stored password hash could not be verified");
        false
    })
}

/// Generate a new random session token (64 hex chars)
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a session token for storage and lookup
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
