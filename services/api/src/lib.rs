//! Fantamatto HTTP API
//!
//! Players register, upload photos of the craziest characters they meet and
//! climb a points leaderboard; a password-gated admin area manages users and
//! submissions. All routes live under `/api`.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod repositories;
pub mod revocation;
pub mod routes;
pub mod state;
pub mod validation;

use std::sync::Arc;

use anyhow::Result;
use axum::{Router, extract::DefaultBodyLimit};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, init_pool},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::{AppConfig, RevocationBackend, StorageBackend},
    jwt::JwtService,
    repositories::{Store, memory::MemoryStore, postgres::PgStore},
    revocation::RevocationList,
    state::{AdminGate, AppState},
};

/// Room for the JSON envelope and base64 expansion around a photo
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the admin gate from a plaintext password and signing secret
pub fn admin_gate(
    password: &str,
    token_secret: &str,
    token_ttl_secs: u64,
    revocations: RevocationList,
) -> Result<AdminGate> {
    Ok(AdminGate {
        password_hash: password::hash_password(password)?.into(),
        jwt_service: JwtService::new(token_secret.as_bytes(), token_ttl_secs),
        revocations,
    })
}

/// Connect storage and the revocation list as configured
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let store: Arc<dyn Store> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;
            Arc::new(PgStore::connect(pool).await?)
        }
    };

    if !store.health_check().await? {
        anyhow::bail!("Storage health check failed");
    }
    info!("Storage ready ({:?})", config.storage.backend);

    let revocations = match config.revocation.backend {
        RevocationBackend::Memory => RevocationList::in_memory(),
        RevocationBackend::Redis => {
            let redis_config = RedisConfig::from_env()?;
            let pool = RedisPool::new(&redis_config).await?;
            if !pool.health_check().await? {
                anyhow::bail!("Redis health check failed");
            }
            RevocationList::Redis(pool)
        }
    };

    Ok(AppState {
        store,
        admin: admin_gate(
            &config.admin.password,
            &config.admin.token_secret,
            config.admin.token_ttl_secs,
            revocations,
        )?,
        max_photo_bytes: config.server.max_photo_bytes,
    })
}

/// The full application: routes plus CORS, tracing and body limits
pub fn build_app(state: AppState) -> Router {
    // base64 inflates the photo by 4/3
    let body_limit = state.max_photo_bytes / 3 * 4 + BODY_OVERHEAD_BYTES;

    routes::create_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
