//! Admin bearer-token validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::{error, warn};

use crate::{error::ApiError, state::AppState};

/// Require a valid, unrevoked admin token and expose its claims to handlers
pub async fn admin_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| ApiError::Unauthorized("Admin token required".to_string()))?;

    let claims = state
        .admin
        .jwt_service
        .validate(bearer.token())
        .map_err(|e| {
            warn!("Rejected admin token: {}", e);
            ApiError::Unauthorized("Invalid or expired admin token".to_string())
        })?;

    let revoked = state
        .admin
        .revocations
        .is_revoked(claims.jti)
        .await
        .map_err(|e| {
            error!("Failed to check admin token revocation: {}", e);
            ApiError::InternalServerError
        })?;

    if revoked {
        return Err(ApiError::Unauthorized("Admin session ended".to_string()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
