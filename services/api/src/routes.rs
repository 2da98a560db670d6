//! API service routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use common::{
    models::{LoginRequest, Matto, MessageResponse, NewMatto, RegisterUser, User},
    photo,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::admin_middleware,
    password::{hash_password, verify_password},
    repositories::{MattoQuery, MattoRecord, UserOrder, UserQuery},
    state::AppState,
    validation,
};

pub mod admin;

/// Public listings never return more than this many rows
const PUBLIC_LIST_LIMIT: i64 = 100;

/// Create the router for the API service, rooted at `/api`
pub fn create_router(state: AppState) -> Router {
    let admin_routes = admin::routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        admin_middleware,
    ));

    let api = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/users", post(register_user).get(get_users))
        .route("/users/:id", get(get_user))
        .route("/login", post(login))
        .route("/leaderboard", get(get_leaderboard))
        .route("/matti", post(create_matto).get(get_matti))
        .route("/matti/user/:user_id", get(get_user_matti))
        .route("/admin/login", post(admin::login))
        .nest("/admin", admin_routes);

    Router::new().nest("/api", api).with_state(state)
}

/// Service banner
pub async fn root() -> impl IntoResponse {
    Json(MessageResponse {
        message: "Fantamatto API - hunting the craziest characters of Ponza!".to_string(),
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage_healthy = state.store.health_check().await.unwrap_or(false);
    let status = if storage_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if storage_healthy { "ok" } else { "degraded" },
            "service": "api",
            "storage_healthy": storage_healthy,
        })),
    )
}

/// Register a new player
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let username = payload.username.trim();
    validation::validate_username(username).map_err(ApiError::BadRequest)?;

    let password_hash = match payload.password.as_deref() {
        Some(password) => {
            validation::validate_password(password).map_err(ApiError::BadRequest)?;
            Some(hash_password(password).map_err(|e| {
                tracing::error!("Failed to hash password: {}", e);
                ApiError::InternalServerError
            })?)
        }
        None => None,
    };

    let user = state.store.create_user(username, password_hash).await?;
    info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(User::from(user))))
}

/// All active players, best first
pub async fn get_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state
        .store
        .list_users(UserQuery {
            order: UserOrder::PointsDesc,
            active_only: true,
            limit: None,
        })
        .await?;

    Ok(Json(users.into_iter().map(User::from).collect()))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Username and password login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(payload) = payload?;
    let user = state
        .store
        .find_user_by_username(payload.username.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Username not found".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Unauthorized("Account disabled".to_string()));
    }

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("No password set for this account".to_string()))?;

    let valid = verify_password(&payload.password, hash).map_err(|e| {
        tracing::error!("Stored password hash for {} is unreadable: {}", user.id, e);
        ApiError::InternalServerError
    })?;
    if !valid {
        warn!("Failed login for user {}", user.id);
        return Err(ApiError::Unauthorized("Wrong password".to_string()));
    }

    Ok(Json(user.into()))
}

/// Active players ranked by points
pub async fn get_leaderboard(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state
        .store
        .list_users(UserQuery {
            order: UserOrder::PointsDesc,
            active_only: true,
            limit: Some(PUBLIC_LIST_LIMIT),
        })
        .await?;

    Ok(Json(users.into_iter().map(User::from).collect()))
}

/// Upload a new submission and credit its points
pub async fn create_matto(
    State(state): State<AppState>,
    payload: Result<Json<NewMatto>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let nickname = payload.nickname.trim().to_string();
    let description = payload.description.trim().to_string();

    validation::validate_nickname(&nickname).map_err(ApiError::BadRequest)?;
    validation::validate_description(&description).map_err(ApiError::BadRequest)?;
    photo::inspect_data_uri(&payload.photo_data, state.max_photo_bytes)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let record = MattoRecord {
        user_id: payload.user_id,
        photo_data: payload.photo_data,
        nickname,
        description,
        rarity: payload.rarity,
    };

    let matto = state.store.create_matto(record).await.map_err(|e| match e {
        common::error::DatabaseError::NotFound { .. } => {
            ApiError::NotFound("User not found or disabled".to_string())
        }
        other => other.into(),
    })?;
    info!(
        "User {} submitted matto {} ({}, +{}pt)",
        matto.user_id, matto.id, matto.rarity, matto.points
    );

    Ok((StatusCode::CREATED, Json(matto)))
}

/// Approved submissions, newest first
pub async fn get_matti(State(state): State<AppState>) -> ApiResult<Json<Vec<Matto>>> {
    let matti = state
        .store
        .list_matti(MattoQuery {
            user_id: None,
            approved_only: true,
            limit: Some(PUBLIC_LIST_LIMIT),
        })
        .await?;

    Ok(Json(matti))
}

/// Approved submissions of one player, newest first
pub async fn get_user_matti(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Matto>>> {
    let matti = state
        .store
        .list_matti(MattoQuery {
            user_id: Some(user_id),
            approved_only: true,
            limit: Some(PUBLIC_LIST_LIMIT),
        })
        .await?;

    Ok(Json(matti))
}
