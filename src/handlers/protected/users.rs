use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
};

use super::utils::parse_id;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{parse_json, ApiResponse, ApiResult, AuthUser};
use crate::models::{ProfileInput, User};

const NOT_FOUND: &str = "User not found";

/// GET /api/users - every profile, newest first
pub async fn users_list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.store.list_users().await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/users/:id
pub async fn user_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let id = parse_id(&id)?;
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:id - owner only; the body is not parsed for anyone else
pub async fn user_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<User> {
    // A malformed id can never be the caller's own
    let id = match parse_id(&raw_id) {
        Ok(id) if id == user.user_id => id,
        _ => {
            tracing::warn!("User {} attempted to update profile {}", user.user_id, raw_id);
            return Err(ApiError::forbidden("Access denied. You can only update your own profile."));
        }
    };

    let input: ProfileInput = parse_json(&body)?;
    let changes = input.into_changes()?;

    let updated = state
        .store
        .update_user(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(ApiResponse::success(updated).with_message("Profile updated successfully"))
}
