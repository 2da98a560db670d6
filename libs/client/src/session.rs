//! The player session
//!
//! Anonymous until a register or login succeeds; authenticated until an
//! explicit logout. Nothing is persisted.

use common::models::{LoginRequest, Matto, RegisterUser, User};
use tracing::info;

use crate::{
    api::ApiClient,
    error::{ClientError, ClientResult},
};

pub struct Session {
    api: ApiClient,
    current: Option<User>,
}

impl Session {
    pub fn new(api: ApiClient) -> Self {
        Self { api, current: None }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Create an account and log straight into it
    pub async fn register(&mut self, username: &str, password: Option<&str>) -> ClientResult<&User> {
        let username = required(username, "Username")?;
        let body = RegisterUser {
            username: username.to_string(),
            password: password.filter(|p| !p.is_empty()).map(str::to_string),
        };

        let user = self.api.register(&body).await?;
        info!("Registered as {}", user.username);
        Ok(self.current.insert(user))
    }

    pub async fn login(&mut self, username: &str, password: &str) -> ClientResult<&User> {
        let username = required(username, "Username")?;
        if password.is_empty() {
            return Err(ClientError::Validation("Password is required".to_string()));
        }

        let user = self
            .api
            .login(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        info!("Logged in as {}", user.username);
        Ok(self.current.insert(user))
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.current.take() {
            info!("Logged out {}", user.username);
        }
    }

    /// Re-read the current user by id, e.g. after points were credited
    pub async fn refresh(&mut self) -> ClientResult<&User> {
        let id = self.current.as_ref().ok_or(ClientError::Anonymous)?.id;
        let user = self.api.user(id).await?;
        Ok(self.current.insert(user))
    }

    /// The current player's approved submissions, newest first
    pub async fn matti(&self) -> ClientResult<Vec<Matto>> {
        let id = self.current.as_ref().ok_or(ClientError::Anonymous)?.id;
        self.api.user_matti(id).await
    }
}

fn required<'a>(value: &'a str, field: &str) -> ClientResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::Validation(format!("{} is required", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    // Nothing listens here; any request would fail with a transport error.
    fn offline_session() -> Session {
        Session::new(ApiClient::new(&ClientConfig::new("http://127.0.0.1:9")))
    }

    #[tokio::test]
    async fn test_blank_username_is_rejected_locally() {
        let mut session = offline_session();
        assert!(matches!(
            session.register("   ", None).await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            session.login("", "secret").await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            session.login("ana", "").await,
            Err(ClientError::Validation(_))
        ));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_requires_a_user() {
        let mut session = offline_session();
        assert!(matches!(
            session.refresh().await,
            Err(ClientError::Anonymous)
        ));
    }
}
