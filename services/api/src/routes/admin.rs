//! Admin routes
//!
//! Everything here except [`login`] sits behind
//! [`admin_middleware`](crate::middleware::admin_middleware), which puts the
//! caller's [`AdminClaims`] into the request extensions.

use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use common::models::{
    AdminCreateUser, AdminLoginRequest, AdminToken, Matto, MattoModeration, MessageResponse,
    Stats, User, UserUpdate,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    jwt::AdminClaims,
    password::{hash_password, verify_password},
    repositories::{MattoQuery, UserChanges, UserOrder, UserQuery},
    state::AppState,
    validation,
};

/// Routes that require an admin token
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/stats", get(stats))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/matti", get(list_matti))
        .route("/matti/:id", put(moderate_matto).delete(delete_matto))
        .route("/reset-points", post(reset_points))
}

fn hash(password: &str) -> ApiResult<String> {
    hash_password(password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::InternalServerError
    })
}

/// Exchange the admin password for a short-lived bearer token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> ApiResult<Json<AdminToken>> {
    let Json(payload) = payload?;
    let valid = verify_password(&payload.password, &state.admin.password_hash).map_err(|e| {
        error!("Admin password hash is unreadable: {}", e);
        ApiError::InternalServerError
    })?;

    if !valid {
        warn!("Rejected admin login");
        return Err(ApiError::Unauthorized("Wrong admin password".to_string()));
    }

    let (access_token, claims) = state.admin.jwt_service.issue().map_err(|e| {
        error!("Failed to issue admin token: {}", e);
        ApiError::InternalServerError
    })?;
    info!("Admin session {} opened", claims.jti);

    Ok(Json(AdminToken {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.admin.jwt_service.ttl_secs(),
    }))
}

/// Revoke the presented admin token
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .admin
        .revocations
        .revoke(claims.jti, claims.remaining_secs())
        .await
        .map_err(|e| {
            error!("Failed to revoke admin token: {}", e);
            ApiError::InternalServerError
        })?;
    info!("Admin session {} closed", claims.jti);

    Ok(Json(MessageResponse {
        message: "Admin session closed".to_string(),
    }))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Stats>> {
    Ok(Json(state.store.stats().await?))
}

/// Every user, active or not, newest first
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state
        .store
        .list_users(UserQuery {
            order: UserOrder::NewestFirst,
            active_only: false,
            limit: None,
        })
        .await?;

    Ok(Json(users.into_iter().map(User::from).collect()))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<AdminCreateUser>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let username = payload.username.trim();
    validation::validate_username(username).map_err(ApiError::BadRequest)?;
    validation::validate_password(&payload.password).map_err(ApiError::BadRequest)?;

    let user = state
        .store
        .create_user(username, Some(hash(&payload.password)?))
        .await?;
    info!("Admin created user {}", user.id);

    Ok((StatusCode::CREATED, Json(User::from(user))))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(update) = payload?;

    let username = match update.username {
        Some(username) => {
            let username = username.trim().to_string();
            validation::validate_username(&username).map_err(ApiError::BadRequest)?;
            Some(username)
        }
        None => None,
    };

    let password_hash = match update.password.as_deref() {
        Some(password) => {
            validation::validate_password(password).map_err(ApiError::BadRequest)?;
            Some(hash(password)?)
        }
        None => None,
    };

    if let Some(points) = update.total_points {
        validation::validate_points(points).map_err(ApiError::BadRequest)?;
    }

    let changes = UserChanges {
        username,
        password_hash,
        total_points: update.total_points,
        is_active: update.is_active,
    };

    let user = state.store.update_user(id, changes).await?;
    info!("Admin updated user {}", id);

    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.store.delete_user(id).await?;
    info!("Admin deleted user {} and their matti", id);

    Ok(Json(MessageResponse {
        message: "User deleted".to_string(),
    }))
}

/// Every submission, approved or not, newest first
pub async fn list_matti(State(state): State<AppState>) -> ApiResult<Json<Vec<Matto>>> {
    let matti = state
        .store
        .list_matti(MattoQuery {
            user_id: None,
            approved_only: false,
            limit: None,
        })
        .await?;

    Ok(Json(matti))
}

/// Approve or hide a submission; content and points are immutable
pub async fn moderate_matto(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<MattoModeration>, JsonRejection>,
) -> ApiResult<Json<Matto>> {
    let Json(moderation) = payload?;
    let matto = state
        .store
        .set_matto_approval(id, moderation.is_approved)
        .await?;
    info!(
        "Admin set matto {} approved={}",
        id, moderation.is_approved
    );

    Ok(Json(matto))
}

pub async fn delete_matto(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.store.delete_matto(id).await?;
    info!("Admin deleted matto {}", id);

    Ok(Json(MessageResponse {
        message: "Matto deleted".to_string(),
    }))
}

/// Zero every player's balance
pub async fn reset_points(State(state): State<AppState>) -> ApiResult<Json<MessageResponse>> {
    let touched = state.store.reset_points().await?;
    warn!("Admin reset points of {} users", touched);

    Ok(Json(MessageResponse {
        message: "All points have been reset".to_string(),
    }))
}
