//! In-process store
//!
//! Rows are kept in insertion order so "newest first" is a reverse walk and
//! ties in the points ordering resolve by registration order, matching the
//! PostgreSQL store.

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use common::models::{Matto, Stats};
use std::cmp::Reverse;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{
    MattoQuery, MattoRecord, Store, StoredUser, UserChanges, UserOrder, UserQuery, check_balance,
    credited,
};

#[derive(Default)]
struct Tables {
    users: Vec<StoredUser>,
    matti: Vec<Matto>,
}

impl Tables {
    fn user_mut(&mut self, id: Uuid) -> DatabaseResult<&mut StoredUser> {
        self.users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(DatabaseError::NotFound { entity: "User", id })
    }

    fn matto_mut(&mut self, id: Uuid) -> DatabaseResult<&mut Matto> {
        self.matti
            .iter_mut()
            .find(|matto| matto.id == id)
            .ok_or(DatabaseError::NotFound { entity: "Matto", id })
    }

    fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|user| user.username == username && Some(user.id) != except)
    }
}

/// Store backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        info!("Using in-memory storage; data is lost on restart");
        Self::default()
    }
}

fn limited<T>(rows: impl Iterator<Item = T>, limit: Option<i64>) -> Vec<T> {
    match limit.and_then(|l| usize::try_from(l).ok()) {
        Some(limit) => rows.take(limit).collect(),
        None => rows.collect(),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(true)
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: Option<String>,
    ) -> DatabaseResult<StoredUser> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(username, None) {
            return Err(DatabaseError::Conflict("Username".to_string()));
        }

        let user = StoredUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            total_points: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<StoredUser>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<StoredUser>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn list_users(&self, query: UserQuery) -> DatabaseResult<Vec<StoredUser>> {
        let tables = self.tables.read().await;
        let mut users: Vec<StoredUser> = tables
            .users
            .iter()
            .filter(|user| !query.active_only || user.is_active)
            .cloned()
            .collect();

        match query.order {
            UserOrder::PointsDesc => users.sort_by_key(|user| Reverse(user.total_points)),
            UserOrder::NewestFirst => users.reverse(),
        }

        Ok(limited(users.into_iter(), query.limit))
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> DatabaseResult<StoredUser> {
        let mut tables = self.tables.write().await;
        if let Some(username) = &changes.username {
            if tables.username_taken(username, Some(id)) {
                return Err(DatabaseError::Conflict("Username".to_string()));
            }
        }

        if let Some(points) = changes.total_points {
            check_balance(points)?;
        }

        let user = tables.user_mut(id)?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = Some(hash);
        }
        if let Some(points) = changes.total_points {
            user.total_points = points;
        }
        if let Some(active) = changes.is_active {
            user.is_active = active;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> DatabaseResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|user| user.id != id);
        if tables.users.len() == before {
            return Err(DatabaseError::NotFound { entity: "User", id });
        }
        tables.matti.retain(|matto| matto.user_id != id);
        Ok(())
    }

    async fn reset_points(&self) -> DatabaseResult<u64> {
        let mut tables = self.tables.write().await;
        for user in tables.users.iter_mut() {
            user.total_points = 0;
        }
        Ok(tables.users.len() as u64)
    }

    async fn create_matto(&self, record: MattoRecord) -> DatabaseResult<Matto> {
        let mut tables = self.tables.write().await;
        let points = record.points();
        let owner = tables
            .users
            .iter_mut()
            .find(|user| user.id == record.user_id && user.is_active)
            .ok_or(DatabaseError::NotFound {
                entity: "User",
                id: record.user_id,
            })?;

        owner.total_points = credited(owner.total_points, points)?;
        let matto = Matto {
            id: Uuid::new_v4(),
            user_id: owner.id,
            username: owner.username.clone(),
            photo_data: record.photo_data,
            nickname: record.nickname,
            description: record.description,
            rarity: record.rarity,
            points,
            is_approved: true,
            created_at: Utc::now(),
        };
        tables.matti.push(matto.clone());
        Ok(matto)
    }

    async fn list_matti(&self, query: MattoQuery) -> DatabaseResult<Vec<Matto>> {
        let tables = self.tables.read().await;
        let rows = tables
            .matti
            .iter()
            .rev()
            .filter(|matto| !query.approved_only || matto.is_approved)
            .filter(|matto| query.user_id.is_none_or(|id| matto.user_id == id))
            .cloned();
        Ok(limited(rows, query.limit))
    }

    async fn set_matto_approval(&self, id: Uuid, is_approved: bool) -> DatabaseResult<Matto> {
        let mut tables = self.tables.write().await;
        let matto = tables.matto_mut(id)?;
        matto.is_approved = is_approved;
        Ok(matto.clone())
    }

    async fn delete_matto(&self, id: Uuid) -> DatabaseResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.matti.len();
        tables.matti.retain(|matto| matto.id != id);
        if tables.matti.len() == before {
            return Err(DatabaseError::NotFound { entity: "Matto", id });
        }
        Ok(())
    }

    async fn stats(&self) -> DatabaseResult<Stats> {
        let tables = self.tables.read().await;
        Ok(Stats {
            total_users: tables.users.len() as i64,
            total_matti: tables.matti.len() as i64,
            total_points: tables
                .users
                .iter()
                .try_fold(0i64, |sum, user| sum.checked_add(user.total_points))
                .ok_or_else(|| DatabaseError::OutOfRange("Total points overflow".to_string()))?,
            pending_matti: tables.matti.iter().filter(|m| !m.is_approved).count() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::{MAX_TOTAL_POINTS, Rarity};

    fn record(user_id: Uuid, rarity: Rarity) -> MattoRecord {
        MattoRecord {
            user_id,
            photo_data: "data:image/png;base64,AAAA".to_string(),
            nickname: "Il Pescatore".to_string(),
            description: String::new(),
            rarity,
        }
    }

    #[tokio::test]
    async fn test_create_matto_credits_owner() {
        let store = MemoryStore::new();
        let ana = store.create_user("ana", None).await.unwrap();

        let matto = store.create_matto(record(ana.id, Rarity::Epic)).await.unwrap();
        assert_eq!(matto.points, 50);
        assert_eq!(matto.username, "ana");

        let ana = store.find_user(ana.id).await.unwrap().unwrap();
        assert_eq!(ana.total_points, 50);
    }

    #[tokio::test]
    async fn test_balance_never_passes_the_cap() {
        let store = MemoryStore::new();
        let ana = store.create_user("ana", None).await.unwrap();

        let too_much = UserChanges {
            total_points: Some(i64::MAX),
            ..Default::default()
        };
        let result = store.update_user(ana.id, too_much).await;
        assert!(matches!(result, Err(DatabaseError::OutOfRange(_))));

        let at_cap = UserChanges {
            total_points: Some(MAX_TOTAL_POINTS - 5),
            ..Default::default()
        };
        store.update_user(ana.id, at_cap).await.unwrap();

        let result = store.create_matto(record(ana.id, Rarity::Common)).await;
        assert!(matches!(result, Err(DatabaseError::OutOfRange(_))));

        let ana = store.find_user(ana.id).await.unwrap().unwrap();
        assert_eq!(ana.total_points, MAX_TOTAL_POINTS - 5);
        assert_eq!(store.stats().await.unwrap().total_matti, 0);
    }

    #[tokio::test]
    async fn test_inactive_owner_cannot_submit() {
        let store = MemoryStore::new();
        let ana = store.create_user("ana", None).await.unwrap();
        store
            .update_user(
                ana.id,
                UserChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = store.create_matto(record(ana.id, Rarity::Common)).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_usernames_conflict() {
        let store = MemoryStore::new();
        store.create_user("ana", None).await.unwrap();
        let bob = store.create_user("bob", None).await.unwrap();

        assert!(matches!(
            store.create_user("ana", None).await,
            Err(DatabaseError::Conflict(_))
        ));
        let rename = UserChanges {
            username: Some("ana".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_user(bob.id, rename).await,
            Err(DatabaseError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_points_order_breaks_ties_by_registration() {
        let store = MemoryStore::new();
        let first = store.create_user("first", None).await.unwrap();
        let second = store.create_user("second", None).await.unwrap();
        let third = store.create_user("third", None).await.unwrap();
        store.create_matto(record(third.id, Rarity::Rare)).await.unwrap();

        let users = store
            .list_users(UserQuery {
                order: UserOrder::PointsDesc,
                active_only: true,
                limit: None,
            })
            .await
            .unwrap();
        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![third.id, first.id, second.id]);
    }

    #[tokio::test]
    async fn test_delete_user_removes_their_matti() {
        let store = MemoryStore::new();
        let ana = store.create_user("ana", None).await.unwrap();
        let bob = store.create_user("bob", None).await.unwrap();
        store.create_matto(record(ana.id, Rarity::Rare)).await.unwrap();
        store.create_matto(record(bob.id, Rarity::Rare)).await.unwrap();

        store.delete_user(ana.id).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_matti, 1);
        assert!(matches!(
            store.delete_user(ana.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_reset_points_is_idempotent() {
        let store = MemoryStore::new();
        let ana = store.create_user("ana", None).await.unwrap();
        store.create_matto(record(ana.id, Rarity::Legendary)).await.unwrap();

        store.reset_points().await.unwrap();
        let once = store.stats().await.unwrap();
        store.reset_points().await.unwrap();
        let twice = store.stats().await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.total_points, 0);
    }
}
