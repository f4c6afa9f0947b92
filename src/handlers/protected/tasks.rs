use axum::extract::{Extension, Path, State};
use serde_json::{json, Value};
use uuid::Uuid;

use super::utils::{parse_id, task_view, task_views};
use crate::access::task_access;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::models::{Task, TaskInput, TaskView};

const NOT_FOUND: &str = "Task not found or access denied";

/// Creator and assignee share full access; everyone else gets a 404.
async fn writable_task(state: &AppState, id: Uuid, caller: Uuid) -> Result<Task, ApiError> {
    state
        .store
        .find_task(id)
        .await?
        .filter(|task| task_access(caller, task).can_write())
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// GET /api/tasks - tasks the caller created or is assigned to
pub async fn tasks_list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<TaskView>> {
    let tasks = state.store.list_tasks(user.user_id).await?;
    let views = task_views(state.store.as_ref(), tasks).await?;
    Ok(ApiResponse::success(views))
}

/// POST /api/tasks
pub async fn task_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(input): ValidJson<TaskInput>,
) -> ApiResult<TaskView> {
    let task = input.into_new(user.user_id)?;
    let created = state.store.insert_task(task).await?;
    tracing::info!("Task {} created by {} for {}", created.id, created.created_by, created.assigned_to);

    let view = task_view(state.store.as_ref(), created).await?;
    Ok(ApiResponse::created(view).with_message("Task created successfully"))
}

/// PUT /api/tasks/:id
pub async fn task_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<TaskInput>,
) -> ApiResult<TaskView> {
    let id = parse_id(&id)?;
    writable_task(&state, id, user.user_id).await?;
    let changes = input.into_changes()?;

    let updated = state
        .store
        .update_task(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let view = task_view(state.store.as_ref(), updated).await?;
    Ok(ApiResponse::success(view).with_message("Task updated successfully"))
}

/// DELETE /api/tasks/:id
pub async fn task_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    writable_task(&state, id, user.user_id).await?;

    if !state.store.delete_task(id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(ApiResponse::success(json!({ "id": id })).with_message("Task deleted successfully"))
}
