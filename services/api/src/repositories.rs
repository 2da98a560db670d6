//! Repositories for database operations
//!
//! [`Store`] is the persistence port of the service. Handlers only talk to
//! `Arc<dyn Store>`; [`postgres::PgStore`] backs production and
//! [`memory::MemoryStore`] backs tests and throwaway deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use common::models::{MAX_TOTAL_POINTS, Matto, Rarity, Stats, User};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

/// A user row, including the credential that never leaves the service
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: Option<String>,
    pub total_points: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        User {
            id: stored.id,
            username: stored.username,
            total_points: stored.total_points,
            is_active: stored.is_active,
            created_at: stored.created_at,
        }
    }
}

/// Already validated and hashed changes to a user
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub total_points: Option<i64>,
    pub is_active: Option<bool>,
}

/// Ordering for user listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOrder {
    /// Highest balance first, earliest registration breaking ties
    PointsDesc,
    NewestFirst,
}

#[derive(Debug, Clone, Copy)]
pub struct UserQuery {
    pub order: UserOrder,
    pub active_only: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub struct MattoQuery {
    pub user_id: Option<Uuid>,
    pub approved_only: bool,
    pub limit: Option<i64>,
}

/// A validated submission ready to be stored
#[derive(Debug, Clone)]
pub struct MattoRecord {
    pub user_id: Uuid,
    pub photo_data: String,
    pub nickname: String,
    pub description: String,
    pub rarity: Rarity,
}

impl MattoRecord {
    /// Points credited for this record, fixed at creation
    pub fn points(&self) -> i64 {
        self.rarity.points()
    }
}

/// Refuse a balance outside `0..=MAX_TOTAL_POINTS`
pub(crate) fn check_balance(points: i64) -> DatabaseResult<()> {
    if (0..=MAX_TOTAL_POINTS).contains(&points) {
        Ok(())
    } else {
        Err(DatabaseError::OutOfRange(format!(
            "Points balance must be between 0 and {}",
            MAX_TOTAL_POINTS
        )))
    }
}

/// `balance + points`, refused past [`MAX_TOTAL_POINTS`]
pub(crate) fn credited(balance: i64, points: i64) -> DatabaseResult<i64> {
    let total = balance.checked_add(points).unwrap_or(i64::MAX);
    check_balance(total)?;
    Ok(total)
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Check storage connectivity
    async fn health_check(&self) -> DatabaseResult<bool>;

    async fn create_user(
        &self,
        username: &str,
        password_hash: Option<String>,
    ) -> DatabaseResult<StoredUser>;

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<StoredUser>>;

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<StoredUser>>;

    async fn list_users(&self, query: UserQuery) -> DatabaseResult<Vec<StoredUser>>;

    /// Apply changes; fails with `NotFound` for an unknown id
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> DatabaseResult<StoredUser>;

    /// Delete a user and every submission they own
    async fn delete_user(&self, id: Uuid) -> DatabaseResult<()>;

    /// Zero every balance, returning the number of users touched
    async fn reset_points(&self) -> DatabaseResult<u64>;

    /// Store a submission and credit its points to the owner in one step.
    ///
    /// Fails with `NotFound` when the owner is missing or inactive.
    async fn create_matto(&self, record: MattoRecord) -> DatabaseResult<Matto>;

    /// Submissions, newest first
    async fn list_matti(&self, query: MattoQuery) -> DatabaseResult<Vec<Matto>>;

    async fn set_matto_approval(&self, id: Uuid, is_approved: bool) -> DatabaseResult<Matto>;

    async fn delete_matto(&self, id: Uuid) -> DatabaseResult<()>;

    async fn stats(&self) -> DatabaseResult<Stats>;
}
