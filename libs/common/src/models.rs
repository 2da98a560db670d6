//! Wire model shared by the API service and its clients
//!
//! Every type here is serialized as JSON exactly as it travels over
//! `/api`. Storage rows live in the API crate and are mapped into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Upper bound of any balance, enforced by both stores
pub const MAX_TOTAL_POINTS: i64 = 1_000_000_000;

/// Rarity tier of a submission
///
/// The tier fixes the points a submission is worth at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All tiers, lowest first
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    /// Points credited for a submission of this tier
    pub const fn points(self) -> i64 {
        match self {
            Rarity::Common => 10,
            Rarity::Rare => 25,
            Rarity::Epic => 50,
            Rarity::Legendary => 100,
        }
    }

    /// Wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    /// Badge text shown next to a submission
    pub const fn badge(self) -> &'static str {
        match self {
            Rarity::Common => "COMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
            Rarity::Legendary => "LEGENDARY",
        }
    }

    /// Display icon
    pub const fn icon(self) -> &'static str {
        match self {
            Rarity::Common => "🏆",
            Rarity::Rare => "⚡",
            Rarity::Epic => "⭐",
            Rarity::Legendary => "👑",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no rarity tier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rarity tier: {0}")]
pub struct UnknownRarity(pub String);

impl FromStr for Rarity {
    type Err = UnknownRarity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .into_iter()
            .find(|rarity| rarity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRarity(s.to_string()))
    }
}

/// A player as returned by the API. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub total_points: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A photo submission ("matto")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    /// Image encoded as a `data:` URI
    pub photo_data: String,
    pub nickname: String,
    pub description: String,
    pub rarity: Rarity,
    pub points: i64,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration payload for `POST /users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Credentials for `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Payload for `POST /matti`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatto {
    pub user_id: Uuid,
    pub username: String,
    pub photo_data: String,
    pub nickname: String,
    #[serde(default)]
    pub description: String,
    pub rarity: Rarity,
}

/// Payload for `POST /admin/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

/// Short-lived admin credential issued by `POST /admin/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds from issuance
    pub expires_in: u64,
}

/// Payload for `POST /admin/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreateUser {
    pub username: String,
    pub password: String,
}

/// Partial update for `PUT /admin/users/{id}`; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserUpdate {
    /// True when applying the update would change nothing
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.total_points.is_none()
            && self.is_active.is_none()
    }
}

/// Moderation change for `PUT /admin/matti/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MattoModeration {
    pub is_approved: bool,
}

/// Aggregates returned by `GET /admin/stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_users: i64,
    pub total_matti: i64,
    pub total_points: i64,
    pub pending_matti: i64,
}

/// Plain acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body produced by every failing route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
