//! Admin token issuance and validation
//!
//! A successful admin login yields an HS256 JWT with a unique `jti` and a
//! bounded lifetime. Admin routes accept it as a bearer credential; logout
//! revokes the `jti` for whatever lifetime the token has left.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const ADMIN_SUBJECT: &str = "admin";

/// Admin token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    /// Token id, the unit of revocation
    pub jti: Uuid,
    pub iat: u64,
    pub exp: u64,
}

impl AdminClaims {
    /// Seconds until the token expires, zero once it has
    pub fn remaining_secs(&self) -> u64 {
        self.exp.saturating_sub(unix_now())
    }
}

/// Signs and verifies admin tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl JwtService {
    /// Initialize a new JWT service from a shared secret
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.sub = Some(ADMIN_SUBJECT.to_string());

        JwtService {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        }
    }

    /// Generate a fresh admin token
    pub fn issue(&self) -> Result<(String, AdminClaims)> {
        self.issue_at(unix_now())
    }

    fn issue_at(&self, now: u64) -> Result<(String, AdminClaims)> {
        let claims = AdminClaims {
            sub: ADMIN_SUBJECT.to_string(),
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((token, claims))
    }

    /// Validate a token's signature, subject and expiry
    pub fn validate(&self, token: &str) -> Result<AdminClaims> {
        let token_data = decode::<AdminClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Token lifetime in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
