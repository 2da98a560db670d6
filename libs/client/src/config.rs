//! Client configuration

use std::env;

use crate::error::{ClientError, ClientResult};

/// Rows shown by the leaderboard and gallery
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, without the `/api` suffix
    pub base_url: String,
    pub display_limit: usize,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> ClientResult<Self> {
        let base_url =
            env::var("FANTAMATTO_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

        let display_limit = match env::var("FANTAMATTO_DISPLAY_LIMIT") {
            Ok(value) => value.parse().map_err(|_| {
                ClientError::Configuration(format!(
                    "FANTAMATTO_DISPLAY_LIMIT must be a positive integer, got {:?}",
                    value
                ))
            })?,
            Err(_) => DEFAULT_DISPLAY_LIMIT,
        };

        if display_limit == 0 {
            return Err(ClientError::Configuration(
                "FANTAMATTO_DISPLAY_LIMIT must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            display_limit,
        })
    }

    /// Root every route hangs off
    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url.trim_end_matches('/'))
    }
}
