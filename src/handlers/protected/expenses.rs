// Expense CRUD. Every store call is scoped by (id, owner), so a document
// owned by someone else looks exactly like a missing one.
use axum::extract::{Extension, Path, State};
use chrono::Utc;
use serde_json::{json, Value};

use super::utils::parse_id;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::models::{Expense, ExpenseInput};

const NOT_FOUND: &str = "Expense not found";

/// GET /api/expenses - the caller's expenses, newest date first
pub async fn expenses_list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Expense>> {
    let expenses = state.store.list_expenses(user.user_id).await?;
    Ok(ApiResponse::success(expenses))
}

/// POST /api/expenses
pub async fn expense_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(input): ValidJson<ExpenseInput>,
) -> ApiResult<Expense> {
    let expense = input.into_new(user.user_id, Utc::now())?;
    let created = state.store.insert_expense(expense).await?;
    tracing::info!("Expense {} created by {}", created.id, user.user_id);
    Ok(ApiResponse::created(created).with_message("Expense created successfully"))
}

/// PUT /api/expenses/:id
pub async fn expense_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<ExpenseInput>,
) -> ApiResult<Expense> {
    let id = parse_id(&id)?;
    let changes = input.into_changes()?;

    let updated = state
        .store
        .update_expense(id, user.user_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(ApiResponse::success(updated).with_message("Expense updated successfully"))
}

/// DELETE /api/expenses/:id
pub async fn expense_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    if !state.store.delete_expense(id, user.user_id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(ApiResponse::success(json!({ "id": id })).with_message("Expense deleted successfully"))
}
