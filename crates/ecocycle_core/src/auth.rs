use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// bcrypt work factor used unless configured otherwise.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).context("Failed to hash password")
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Stored password hash is malformed")
}

/// Opaque session token handed to the client in a cookie.
///
/// Only [`SessionToken::digest`] is ever written to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn from_cookie(value: &str) -> Option<Self> {
        let v = value.trim();
        if v.is_empty() {
            None
        } else {
            Some(Self(v.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn digest(&self) -> String {
        let mut h = Sha256::new();
        h.update(self.0.as_bytes());
        hex::encode(h.finalize())
    }
}
