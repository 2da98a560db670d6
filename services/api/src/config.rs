//! Service configuration
//!
//! Values are layered: built-in defaults, then an optional `fantamatto.toml`
//! in the working directory, then `FANTAMATTO__SECTION__KEY` environment
//! variables (e.g. `FANTAMATTO__SERVER__PORT=8000`).

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Top-level configuration of the API service
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub revocation: RevocationConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest decoded photo accepted by `POST /matti`
    pub max_photo_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Admin gate settings
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Shared admin password, hashed at startup
    pub password: String,
    /// HMAC secret used to sign admin tokens
    pub token_secret: String,
    pub token_ttl_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevocationConfig {
    pub backend: RevocationBackend,
}

impl AppConfig {
    /// Load configuration from defaults, `fantamatto.toml` and the environment
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.max_photo_bytes", 5 * 1024 * 1024)?
            .set_default("storage.backend", "memory")?
            .set_default("admin.token_ttl_secs", 900)?
            .set_default("revocation.backend", "memory")?
            .add_source(File::with_name("fantamatto").required(false))
            .add_source(Environment::with_prefix("FANTAMATTO").separator("__"))
            .build()
            .context("Failed to read configuration")?;

        let config: AppConfig = config
            .try_deserialize()
            .context("Invalid configuration (are FANTAMATTO__ADMIN__PASSWORD and FANTAMATTO__ADMIN__TOKEN_SECRET set?)")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.admin.password.is_empty() {
            anyhow::bail!("admin.password must not be empty");
        }
        if self.admin.token_secret.len() < 32 {
            anyhow::bail!("admin.token_secret must be at least 32 bytes");
        }
        if self.admin.token_ttl_secs == 0 {
            anyhow::bail!("admin.token_ttl_secs must be positive");
        }
        Ok(())
    }

    /// Listener address in `host:port` form
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
