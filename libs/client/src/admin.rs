//! The admin panel
//!
//! [`AdminSession`] trades the shared admin password for a short-lived
//! bearer token and forgets the password immediately. [`AdminConsole`]
//! holds the three admin datasets and re-fetches all of them after every
//! successful mutation.

use std::time::{Duration, Instant};

use common::models::{
    AdminCreateUser, AdminLoginRequest, MAX_TOTAL_POINTS, Matto, MattoModeration, Stats, User,
    UserUpdate,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    api::ApiClient,
    error::{ClientError, ClientResult},
    fetch::{Snapshot, ViewModel},
    prompt::Prompter,
};

/// Server-issued admin token and its local expiry
#[derive(Debug, Clone)]
pub struct AdminCredential {
    token: String,
    expires_at: Instant,
}

impl AdminCredential {
    pub fn new(token: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            token: token.into(),
            expires_at: Instant::now() + expires_in,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Locked or unlocked, independent of the player session
pub struct AdminSession {
    api: ApiClient,
    credential: Option<AdminCredential>,
}

impl AdminSession {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            credential: None,
        }
    }

    /// Verify `password` with the server and keep the token it returns
    ///
    /// A failed unlock leaves the session exactly as it was.
    pub async fn unlock(&mut self, password: &str) -> ClientResult<()> {
        if password.is_empty() {
            return Err(ClientError::Validation(
                "Admin password is required".to_string(),
            ));
        }

        let token = self
            .api
            .admin_login(&AdminLoginRequest {
                password: password.to_string(),
            })
            .await?;
        self.credential = Some(AdminCredential::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
        ));
        info!("Admin panel unlocked");
        Ok(())
    }

    /// Drop the token locally and revoke it on the server
    ///
    /// The session is locked even if the revoke call fails.
    pub async fn lock(&mut self) -> ClientResult<()> {
        let Some(credential) = self.credential.take() else {
            return Ok(());
        };
        info!("Admin panel locked");
        if credential.is_expired() {
            return Ok(());
        }
        self.api.admin_logout(&credential).await?;
        Ok(())
    }

    pub fn is_unlocked(&self) -> bool {
        self.credential
            .as_ref()
            .is_some_and(|credential| !credential.is_expired())
    }

    /// The live credential; an expired one locks the session
    pub fn credential(&mut self) -> ClientResult<&AdminCredential> {
        if self.credential.as_ref().is_some_and(AdminCredential::is_expired) {
            warn!("Admin token expired; locking");
            self.credential = None;
        }
        self.credential.as_ref().ok_or(ClientError::Locked)
    }
}

/// A call the server accepted, plus how the re-fetch after it went
///
/// The outcome of the call itself never depends on `refreshed`.
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    pub refreshed: ClientResult<()>,
}

/// A working copy of one entity, edited until saved or cancelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditModal<T> {
    target: Uuid,
    draft: T,
}

impl<T> EditModal<T> {
    pub fn new(target: Uuid, draft: T) -> Self {
        Self { target, draft }
    }

    pub fn target(&self) -> Uuid {
        self.target
    }

    pub fn draft(&self) -> &T {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut T {
        &mut self.draft
    }

    /// Discard the working copy; nothing is sent
    pub fn cancel(self) {}
}

impl EditModal<UserUpdate> {
    /// Send the working copy; the modal survives a failed save
    pub async fn save(&self, console: &mut AdminConsole) -> ClientResult<Applied<User>> {
        console.update_user(self.target, &self.draft).await
    }
}

pub struct AdminConsole {
    api: ApiClient,
    session: AdminSession,
    stats: ViewModel<Stats>,
    users: ViewModel<Vec<User>>,
    matti: ViewModel<Vec<Matto>>,
}

impl AdminConsole {
    pub fn new(api: ApiClient) -> Self {
        Self {
            session: AdminSession::new(api.clone()),
            api,
            stats: ViewModel::new("admin stats"),
            users: ViewModel::new("admin users"),
            matti: ViewModel::new("admin matti"),
        }
    }

    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.is_unlocked()
    }

    /// Unlock, then load every dataset
    ///
    /// The panel stays unlocked when the first load fails.
    pub async fn unlock(&mut self, password: &str) -> ClientResult<Applied<()>> {
        self.session.unlock(password).await?;
        Ok(self.applied(()).await)
    }

    pub async fn lock(&mut self) -> ClientResult<()> {
        self.session.lock().await
    }

    /// Re-fetch stats, users and submissions and wait for all three
    pub async fn refresh_all(&mut self) -> ClientResult<()> {
        let credential = self.session.credential()?.clone();

        let (api, cred) = (self.api.clone(), credential.clone());
        self.stats
            .refresh(async move { api.admin_stats(&cred).await })
            .await;
        let (api, cred) = (self.api.clone(), credential.clone());
        self.users
            .refresh(async move { api.admin_users(&cred).await })
            .await;
        let (api, cred) = (self.api.clone(), credential);
        self.matti
            .refresh(async move { api.admin_matti(&cred).await })
            .await;

        let stats = self.stats.settled_ok().await;
        let users = self.users.settled_ok().await;
        let matti = self.matti.settled_ok().await;
        stats?;
        users?;
        matti?;
        Ok(())
    }

    async fn applied<T>(&mut self, value: T) -> Applied<T> {
        let refreshed = self.refresh_all().await;
        if let Err(e) = &refreshed {
            warn!("Admin data is stale: {}", e);
        }
        Applied { value, refreshed }
    }

    pub fn stats(&self) -> Snapshot<Stats> {
        self.stats.snapshot()
    }

    pub fn users(&self) -> Snapshot<Vec<User>> {
        self.users.snapshot()
    }

    pub fn matti(&self) -> Snapshot<Vec<Matto>> {
        self.matti.snapshot()
    }

    pub async fn create_user(
        &mut self,
        username: &str,
        password: &str,
    ) -> ClientResult<Applied<User>> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let credential = self.session.credential()?;
        let user = self
            .api
            .admin_create_user(
                credential,
                &AdminCreateUser {
                    username: username.to_string(),
                    password: password.to_string(),
                },
            )
            .await?;
        Ok(self.applied(user).await)
    }

    /// Open an edit modal pre-filled from `user`
    pub fn edit_user(&self, user: &User) -> EditModal<UserUpdate> {
        EditModal::new(
            user.id,
            UserUpdate {
                username: Some(user.username.clone()),
                password: None,
                total_points: Some(user.total_points),
                is_active: Some(user.is_active),
            },
        )
    }

    async fn update_user(&mut self, id: Uuid, update: &UserUpdate) -> ClientResult<Applied<User>> {
        if update.total_points.is_some_and(|points| points < 0) {
            return Err(ClientError::Validation(
                "Points cannot be negative".to_string(),
            ));
        }
        if update.total_points.is_some_and(|points| points > MAX_TOTAL_POINTS) {
            return Err(ClientError::Validation(format!(
                "Points must be at most {}",
                MAX_TOTAL_POINTS
            )));
        }
        let mut update = update.clone();
        update.password = update.password.filter(|p| !p.is_empty());

        let credential = self.session.credential()?;
        let user = self.api.admin_update_user(credential, id, &update).await?;
        Ok(self.applied(user).await)
    }

    pub async fn moderate_matto(
        &mut self,
        id: Uuid,
        is_approved: bool,
    ) -> ClientResult<Applied<Matto>> {
        let credential = self.session.credential()?;
        let matto = self
            .api
            .admin_moderate_matto(credential, id, MattoModeration { is_approved })
            .await?;
        Ok(self.applied(matto).await)
    }

    pub async fn delete_user(&mut self, id: Uuid, prompter: &dyn Prompter) -> ClientResult<Applied<()>> {
        self.session.credential()?;
        if !prompter.confirm("Delete this user and all their matti?") {
            return Err(ClientError::Declined);
        }

        let credential = self.session.credential()?;
        self.api.admin_delete_user(credential, id).await?;
        Ok(self.applied(()).await)
    }

    pub async fn delete_matto(&mut self, id: Uuid, prompter: &dyn Prompter) -> ClientResult<Applied<()>> {
        self.session.credential()?;
        if !prompter.confirm("Delete this matto?") {
            return Err(ClientError::Declined);
        }

        let credential = self.session.credential()?;
        self.api.admin_delete_matto(credential, id).await?;
        Ok(self.applied(()).await)
    }

    /// Zero every balance, after two confirmations
    pub async fn reset_points(&mut self, prompter: &dyn Prompter) -> ClientResult<Applied<()>> {
        self.session.credential()?;
        if !prompter.confirm("Reset the points of ALL users?")
            || !prompter.confirm("This cannot be undone. Are you really sure?")
        {
            return Err(ClientError::Declined);
        }

        let credential = self.session.credential()?;
        self.api.admin_reset_points(credential).await?;
        Ok(self.applied(()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn offline_api() -> ApiClient {
        ApiClient::new(&ClientConfig::new("http://127.0.0.1:9"))
    }

    #[test]
    fn test_expired_credential_locks_the_session() {
        let mut session = AdminSession::new(offline_api());
        session.credential = Some(AdminCredential::new("token", Duration::ZERO));

        assert!(!session.is_unlocked());
        assert!(matches!(session.credential(), Err(ClientError::Locked)));
        assert!(session.credential.is_none());
    }

    #[test]
    fn test_live_credential_is_returned() {
        let mut session = AdminSession::new(offline_api());
        session.credential = Some(AdminCredential::new("token", Duration::from_secs(60)));

        assert!(session.is_unlocked());
        assert_eq!(session.credential().unwrap().token(), "token");
    }

    #[test]
    fn test_lock_without_live_token_sends_nothing() {
        let mut session = AdminSession::new(offline_api());
        assert!(tokio_test::block_on(session.lock()).is_ok());

        session.credential = Some(AdminCredential::new("token", Duration::ZERO));
        assert!(tokio_test::block_on(session.lock()).is_ok());
        assert!(session.credential.is_none());
    }

    #[tokio::test]
    async fn test_locked_console_refuses_before_any_request() {
        let mut console = AdminConsole::new(offline_api());
        assert!(matches!(console.refresh_all().await, Err(ClientError::Locked)));
        assert!(matches!(
            console.create_user("mario", "lungomare").await,
            Err(ClientError::Locked)
        ));
        assert!(matches!(
            console.unlock("").await,
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn test_edit_modal_holds_a_working_copy() {
        let console = AdminConsole::new(offline_api());
        let user = User {
            id: Uuid::new_v4(),
            username: "ana".to_string(),
            total_points: 50,
            is_active: true,
            created_at: chrono::Utc::now(),
        };

        let mut modal = console.edit_user(&user);
        modal.draft_mut().total_points = Some(75);
        assert_eq!(modal.target(), user.id);
        assert_eq!(modal.draft().total_points, Some(75));
        assert_eq!(user.total_points, 50);
        modal.cancel();
    }
}
