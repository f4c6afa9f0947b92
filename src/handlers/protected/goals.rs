// Goals are visible to the creator and every assignee, but only the creator
// may change or delete them.
use axum::extract::{Extension, Path, State};
use serde_json::{json, Value};
use uuid::Uuid;

use super::utils::{goal_view, goal_views, parse_id};
use crate::access::{goal_access, Access};
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::models::{Goal, GoalInput, GoalView};

const NOT_FOUND: &str = "Goal not found or access denied";
const CREATOR_ONLY: &str = "Only the goal creator can modify or delete this goal";

/// Load a goal the caller may modify.
async fn writable_goal(state: &AppState, id: Uuid, caller: Uuid) -> Result<Goal, ApiError> {
    let goal = state
        .store
        .find_goal(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    match goal_access(caller, &goal) {
        Access::ReadWrite => Ok(goal),
        Access::Read => Err(ApiError::forbidden(CREATOR_ONLY)),
        Access::None => Err(ApiError::not_found(NOT_FOUND)),
    }
}

/// GET /api/goals - goals the caller created or is assigned to
pub async fn goals_list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<GoalView>> {
    let goals = state.store.list_goals(user.user_id).await?;
    let views = goal_views(state.store.as_ref(), goals).await?;
    Ok(ApiResponse::success(views))
}

/// POST /api/goals
pub async fn goal_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(input): ValidJson<GoalInput>,
) -> ApiResult<GoalView> {
    let goal = input.into_new(user.user_id)?;
    let created = state.store.insert_goal(goal).await?;
    tracing::info!("Goal {} created by {}", created.id, user.user_id);

    let view = goal_view(state.store.as_ref(), created).await?;
    Ok(ApiResponse::created(view).with_message("Goal created successfully"))
}

/// PUT /api/goals/:id - creator only
pub async fn goal_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<GoalInput>,
) -> ApiResult<GoalView> {
    let id = parse_id(&id)?;
    writable_goal(&state, id, user.user_id).await?;
    let changes = input.into_changes()?;

    let updated = state
        .store
        .update_goal(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let view = goal_view(state.store.as_ref(), updated).await?;
    Ok(ApiResponse::success(view).with_message("Goal updated successfully"))
}

/// DELETE /api/goals/:id - creator only
pub async fn goal_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    writable_goal(&state, id, user.user_id).await?;

    if !state.store.delete_goal(id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(ApiResponse::success(json!({ "id": id })).with_message("Goal deleted successfully"))
}
