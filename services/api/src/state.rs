//! Application state shared across handlers

use std::sync::Arc;

use crate::{jwt::JwtService, repositories::Store, revocation::RevocationList};

/// Everything needed to admit an admin
#[derive(Clone)]
pub struct AdminGate {
    /// Argon2 hash of the configured admin password
    pub password_hash: Arc<str>,
    pub jwt_service: JwtService,
    pub revocations: RevocationList,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub admin: AdminGate,
    pub max_photo_bytes: usize,
}
