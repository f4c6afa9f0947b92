use axum::extract::{Extension, Path, State};
use chrono::Utc;
use serde_json::{json, Value};

use super::utils::parse_id;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::models::{Savings, SavingsInput};

const NOT_FOUND: &str = "Saving not found";

pub async fn savings_list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Savings>> {
    let savings = state.store.list_savings(user.user_id).await?;
    Ok(ApiResponse::success(savings))
}

pub async fn savings_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(input): ValidJson<SavingsInput>,
) -> ApiResult<Savings> {
    let savings = input.into_new(user.user_id, Utc::now())?;
    let created = state.store.insert_savings(savings).await?;
    tracing::info!("Saving {} created by {}", created.id, user.user_id);
    Ok(ApiResponse::created(created).with_message("Saving created successfully"))
}

pub async fn savings_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<SavingsInput>,
) -> ApiResult<Savings> {
    let id = parse_id(&id)?;
    let changes = input.into_changes()?;

    let updated = state
        .store
        .update_savings(id, user.user_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(ApiResponse::success(updated).with_message("Saving updated successfully"))
}

pub async fn savings_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    if !state.store.delete_savings(id, user.user_id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(ApiResponse::success(json!({ "id": id })).with_message("Saving deleted successfully"))
}
