use std::collections::HashMap;
use uuid::Uuid;

use crate::database::Store;
use crate::error::ApiError;
use crate::models::{Goal, GoalView, Task, TaskView, UserSummary};

/// Parse a path id; malformed ids are a client error
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id '{}'", raw)))
}

async fn summaries(store: &dyn Store, ids: Vec<Uuid>) -> Result<HashMap<Uuid, UserSummary>, ApiError> {
    let mut ids = ids;
    ids.sort_unstable();
    ids.dedup();
    Ok(store.user_summaries(&ids).await?)
}

/// Resolve creator and assignee references with one summary lookup.
pub async fn task_views(store: &dyn Store, tasks: Vec<Task>) -> Result<Vec<TaskView>, ApiError> {
    let ids = tasks.iter().flat_map(Task::user_refs).collect();
    let users = summaries(store, ids).await?;
    Ok(tasks.into_iter().map(|task| task.into_view(&users)).collect())
}

pub async fn task_view(store: &dyn Store, task: Task) -> Result<TaskView, ApiError> {
    let users = summaries(store, task.user_refs().to_vec()).await?;
    Ok(task.into_view(&users))
}

pub async fn goal_views(store: &dyn Store, goals: Vec<Goal>) -> Result<Vec<GoalView>, ApiError> {
    let ids = goals.iter().flat_map(Goal::user_refs).collect();
    let users = summaries(store, ids).await?;
    Ok(goals.into_iter().map(|goal| goal.into_view(&users)).collect())
}

pub async fn goal_view(store: &dyn Store, goal: Goal) -> Result<GoalView, ApiError> {
    let users = summaries(store, goal.user_refs()).await?;
    Ok(goal.into_view(&users))
}
