//! PostgreSQL store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use common::models::{Matto, Rarity, Stats};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::{
    MattoQuery, MattoRecord, Store, StoredUser, UserChanges, UserOrder, UserQuery, check_balance,
    credited,
};

const USER_COLUMNS: &str = "id, username, password_hash, total_points, is_active, created_at";
const MATTO_COLUMNS: &str = "id, user_id, username, photo_data, nickname, description, rarity, points, is_approved, created_at";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: Option<String>,
    total_points: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for StoredUser {
    fn from(row: UserRow) -> Self {
        StoredUser {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            total_points: row.total_points,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct MattoRow {
    id: Uuid,
    user_id: Uuid,
    username: String,
    photo_data: String,
    nickname: String,
    description: String,
    rarity: String,
    points: i64,
    is_approved: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<MattoRow> for Matto {
    type Error = DatabaseError;

    fn try_from(row: MattoRow) -> Result<Self, Self::Error> {
        let rarity: Rarity = row
            .rarity
            .parse()
            .map_err(|e| DatabaseError::Corrupt(format!("matto {}: {}", row.id, e)))?;

        Ok(Matto {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            photo_data: row.photo_data,
            nickname: row.nickname,
            description: row.description,
            rarity,
            points: row.points,
            is_approved: row.is_approved,
            created_at: row.created_at,
        })
    }
}

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over `pool`, applying pending migrations
    pub async fn connect(pool: PgPool) -> DatabaseResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> DatabaseResult<bool> {
        common::database::health_check(&self.pool).await
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: Option<String>,
    ) -> DatabaseResult<StoredUser> {
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_query(e, "Username"))?;

        Ok(row.into())
    }

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<StoredUser>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(DatabaseError::Query)?;

        Ok(row.map(Into::into))
    }

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<StoredUser>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.map(Into::into))
    }

    async fn list_users(&self, query: UserQuery) -> DatabaseResult<Vec<StoredUser>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
        if query.active_only {
            builder.push(" WHERE is_active");
        }
        builder.push(match query.order {
            UserOrder::PointsDesc => " ORDER BY total_points DESC, created_at ASC",
            UserOrder::NewestFirst => " ORDER BY created_at DESC",
        });
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows: Vec<UserRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> DatabaseResult<StoredUser> {
        if let Some(points) = changes.total_points {
            check_balance(points)?;
        }

        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                total_points = COALESCE($4, total_points),
                is_active = COALESCE($5, is_active)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.username)
        .bind(changes.password_hash)
        .bind(changes.total_points)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_query(e, "Username"))?;

        row.map(Into::into)
            .ok_or(DatabaseError::NotFound { entity: "User", id })
    }

    async fn delete_user(&self, id: Uuid) -> DatabaseResult<()> {
        // matti rows go with the user through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound { entity: "User", id });
        }
        Ok(())
    }

    async fn reset_points(&self) -> DatabaseResult<u64> {
        let result = sqlx::query("UPDATE users SET total_points = 0")
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected())
    }

    async fn create_matto(&self, record: MattoRecord) -> DatabaseResult<Matto> {
        let points = record.points();
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        let owner: Option<(String, i64)> = sqlx::query_as(
            "SELECT username, total_points FROM users WHERE id = $1 AND is_active FOR UPDATE",
        )
        .bind(record.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        let Some((username, balance)) = owner else {
            return Err(DatabaseError::NotFound {
                entity: "User",
                id: record.user_id,
            });
        };

        sqlx::query("UPDATE users SET total_points = $2 WHERE id = $1")
            .bind(record.user_id)
            .bind(credited(balance, points)?)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

        let row: MattoRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO matti (id, user_id, username, photo_data, nickname, description, rarity, points)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {MATTO_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(username)
        .bind(record.photo_data)
        .bind(record.nickname)
        .bind(record.description)
        .bind(record.rarity.as_str())
        .bind(points)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        tx.commit().await.map_err(DatabaseError::Query)?;
        row.try_into()
    }

    async fn list_matti(&self, query: MattoQuery) -> DatabaseResult<Vec<Matto>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {MATTO_COLUMNS} FROM matti WHERE TRUE"));
        if query.approved_only {
            builder.push(" AND is_approved");
        }
        if let Some(user_id) = query.user_id {
            builder.push(" AND user_id = ").push_bind(user_id);
        }
        builder.push(" ORDER BY created_at DESC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows: Vec<MattoRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        rows.into_iter().map(Matto::try_from).collect()
    }

    async fn set_matto_approval(&self, id: Uuid, is_approved: bool) -> DatabaseResult<Matto> {
        let row: Option<MattoRow> = sqlx::query_as(&format!(
            "UPDATE matti SET is_approved = $2 WHERE id = $1 RETURNING {MATTO_COLUMNS}"
        ))
        .bind(id)
        .bind(is_approved)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.ok_or(DatabaseError::NotFound { entity: "Matto", id })?
            .try_into()
    }

    async fn delete_matto(&self, id: Uuid) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM matti WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound { entity: "Matto", id });
        }
        Ok(())
    }

    async fn stats(&self) -> DatabaseResult<Stats> {
        let (total_users, total_points): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(total_points), 0)::BIGINT FROM users")
                .fetch_one(&self.pool)
                .await
                .map_err(DatabaseError::Query)?;

        let (total_matti, pending_matti): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE NOT is_approved) FROM matti",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(Stats {
            total_users,
            total_matti,
            total_points,
            pending_matti,
        })
    }
}
