//! Leaderboard and gallery projections
//!
//! Both are fetched whole and truncated to the display limit here. The
//! leaderboard keeps the order the server sends.

use common::{
    Rarity,
    models::{Matto, User},
};
use uuid::Uuid;

use crate::{api::ApiClient, fetch::ViewModel};

const MEDALS: [&str; 3] = ["👑", "🥈", "🥉"];

/// One leaderboard line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// 1-based position
    pub rank: usize,
    /// Medal for the podium, `"N."` below it
    pub marker: String,
    pub username: String,
    pub points: i64,
    /// The logged-in player's own row
    pub is_current: bool,
}

/// One gallery card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryCard {
    pub id: Uuid,
    pub nickname: String,
    pub username: String,
    pub description: Option<String>,
    pub rarity: Rarity,
    /// Uppercase tier label, e.g. `EPIC`
    pub badge: &'static str,
    /// e.g. `+50pt`
    pub points_label: String,
    pub photo_data: String,
}

pub fn leaderboard_rows(users: &[User], limit: usize, current: Option<Uuid>) -> Vec<LeaderboardRow> {
    users
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, user)| LeaderboardRow {
            rank: index + 1,
            marker: MEDALS
                .get(index)
                .map(|medal| medal.to_string())
                .unwrap_or_else(|| format!("{}.", index + 1)),
            username: user.username.clone(),
            points: user.total_points,
            is_current: Some(user.id) == current,
        })
        .collect()
}

pub fn gallery_cards(matti: &[Matto], limit: usize) -> Vec<GalleryCard> {
    matti
        .iter()
        .take(limit)
        .map(|matto| GalleryCard {
            id: matto.id,
            nickname: matto.nickname.clone(),
            username: matto.username.clone(),
            description: Some(matto.description.clone()).filter(|d| !d.is_empty()),
            rarity: matto.rarity,
            badge: matto.rarity.badge(),
            points_label: format!("+{}pt", matto.points),
            photo_data: matto.photo_data.clone(),
        })
        .collect()
}

/// Ranked players
pub struct Leaderboard {
    view: ViewModel<Vec<User>>,
    limit: usize,
}

impl Leaderboard {
    pub fn new(limit: usize) -> Self {
        Self {
            view: ViewModel::new("leaderboard"),
            limit,
        }
    }

    pub fn view(&self) -> &ViewModel<Vec<User>> {
        &self.view
    }

    pub async fn load(&self, api: &ApiClient) {
        let api = api.clone();
        self.view.load(async move { api.leaderboard().await }).await;
    }

    pub async fn refresh(&self, api: &ApiClient) {
        let api = api.clone();
        self.view.refresh(async move { api.leaderboard().await }).await;
    }

    pub fn rows(&self, current: Option<Uuid>) -> Vec<LeaderboardRow> {
        match &self.view.snapshot().data {
            Some(users) => leaderboard_rows(users, self.limit, current),
            None => Vec::new(),
        }
    }
}

/// Most recent submissions
pub struct Gallery {
    view: ViewModel<Vec<Matto>>,
    limit: usize,
}

impl Gallery {
    pub fn new(limit: usize) -> Self {
        Self {
            view: ViewModel::new("gallery"),
            limit,
        }
    }

    pub fn view(&self) -> &ViewModel<Vec<Matto>> {
        &self.view
    }

    pub async fn load(&self, api: &ApiClient) {
        let api = api.clone();
        self.view.load(async move { api.matti().await }).await;
    }

    pub async fn refresh(&self, api: &ApiClient) {
        let api = api.clone();
        self.view.refresh(async move { api.matti().await }).await;
    }

    pub fn cards(&self) -> Vec<GalleryCard> {
        match &self.view.snapshot().data {
            Some(matti) => gallery_cards(matti, self.limit),
            None => Vec::new(),
        }
    }
}
