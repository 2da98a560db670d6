//! HTTP adapter for the `/api` service
//!
//! One request per call: no retries, no caching. Non-success responses
//! become [`ClientError::Request`] carrying the server's `error` text.

use common::models::{
    AdminCreateUser, AdminLoginRequest, AdminToken, ErrorBody, LoginRequest, Matto,
    MattoModeration, MessageResponse, NewMatto, RegisterUser, Stats, User, UserUpdate,
};
use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{
    admin::AdminCredential,
    config::ClientConfig,
    error::{ClientError, ClientResult},
};

/// HTTP client bound to one Fantamatto backend
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.api_url())
    }

    /// Reuse an existing [`reqwest::Client`]; `api_url` includes `/api`
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&AdminCredential>,
    ) -> ClientResult<T> {
        self.request(Method::GET, path, None, credential).await
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        body: Option<&B>,
        credential: Option<&AdminCredential>,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body.map(serde_json::to_value).transpose()?;
        self.request(Method::POST, path, body, credential).await
    }

    pub async fn put<B, T>(
        &self,
        path: &str,
        body: &B,
        credential: Option<&AdminCredential>,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, path, Some(body), credential).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&AdminCredential>,
    ) -> ClientResult<T> {
        self.request(Method::DELETE, path, None, credential).await
    }

    // ---- player routes ----

    pub async fn register(&self, body: &RegisterUser) -> ClientResult<User> {
        self.post("/users", Some(body), None).await
    }

    pub async fn login(&self, body: &LoginRequest) -> ClientResult<User> {
        self.post("/login", Some(body), None).await
    }

    pub async fn user(&self, id: Uuid) -> ClientResult<User> {
        self.get(&format!("/users/{}", id), None).await
    }

    pub async fn leaderboard(&self) -> ClientResult<Vec<User>> {
        self.get("/leaderboard", None).await
    }

    pub async fn matti(&self) -> ClientResult<Vec<Matto>> {
        self.get("/matti", None).await
    }

    pub async fn user_matti(&self, user_id: Uuid) -> ClientResult<Vec<Matto>> {
        self.get(&format!("/matti/user/{}", user_id), None).await
    }

    pub async fn create_matto(&self, body: &NewMatto) -> ClientResult<Matto> {
        self.post("/matti", Some(body), None).await
    }

    // ---- admin routes ----

    pub async fn admin_login(&self, body: &AdminLoginRequest) -> ClientResult<AdminToken> {
        self.post("/admin/login", Some(body), None).await
    }

    pub async fn admin_logout(&self, credential: &AdminCredential) -> ClientResult<MessageResponse> {
        self.post::<(), _>("/admin/logout", None, Some(credential))
            .await
    }

    pub async fn admin_stats(&self, credential: &AdminCredential) -> ClientResult<Stats> {
        self.get("/admin/stats", Some(credential)).await
    }

    pub async fn admin_users(&self, credential: &AdminCredential) -> ClientResult<Vec<User>> {
        self.get("/admin/users", Some(credential)).await
    }

    pub async fn admin_create_user(
        &self,
        credential: &AdminCredential,
        body: &AdminCreateUser,
    ) -> ClientResult<User> {
        self.post("/admin/users", Some(body), Some(credential)).await
    }

    pub async fn admin_update_user(
        &self,
        credential: &AdminCredential,
        id: Uuid,
        body: &UserUpdate,
    ) -> ClientResult<User> {
        self.put(&format!("/admin/users/{}", id), body, Some(credential))
            .await
    }

    pub async fn admin_delete_user(
        &self,
        credential: &AdminCredential,
        id: Uuid,
    ) -> ClientResult<MessageResponse> {
        self.delete(&format!("/admin/users/{}", id), Some(credential))
            .await
    }

    pub async fn admin_matti(&self, credential: &AdminCredential) -> ClientResult<Vec<Matto>> {
        self.get("/admin/matti", Some(credential)).await
    }

    pub async fn admin_moderate_matto(
        &self,
        credential: &AdminCredential,
        id: Uuid,
        body: MattoModeration,
    ) -> ClientResult<Matto> {
        self.put(&format!("/admin/matti/{}", id), &body, Some(credential))
            .await
    }

    pub async fn admin_delete_matto(
        &self,
        credential: &AdminCredential,
        id: Uuid,
    ) -> ClientResult<MessageResponse> {
        self.delete(&format!("/admin/matti/{}", id), Some(credential))
            .await
    }

    pub async fn admin_reset_points(
        &self,
        credential: &AdminCredential,
    ) -> ClientResult<MessageResponse> {
        self.post::<(), _>("/admin/reset-points", None, Some(credential))
            .await
    }

    // ---- private helpers ----

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        credential: Option<&AdminCredential>,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.api_url, path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(credential) = credential {
            request = request.bearer_auth(credential.token());
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::Request {
                status: status.as_u16(),
                message: error_message(status, &bytes),
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Best human-readable text for a failed response
fn error_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    if let Ok(ErrorBody { error }) = serde_json::from_slice(body) {
        return error;
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return text;
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
