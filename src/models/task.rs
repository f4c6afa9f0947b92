use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use super::{check_max_len, nullable, nullable_date, required_text, trimmed, FieldErrors, UserSummary};

pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task with its user references resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub assigned_to: Option<UserSummary>,
    pub created_by: Option<UserSummary>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Users this task references, for the summary join.
    pub fn user_refs(&self) -> [Uuid; 2] {
        [self.created_by, self.assigned_to]
    }

    pub fn into_view(self, users: &HashMap<Uuid, UserSummary>) -> TaskView {
        TaskView {
            id: self.id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            assigned_to: users.get(&self.assigned_to).cloned(),
            created_by: users.get(&self.created_by).cloned(),
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub assigned_to: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable_date")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
    pub due_date: Option<DateTime<Utc>>,
}

/// Update set. `Some(None)` on a nullable field clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskInput {
    pub fn into_new(self, creator: Uuid) -> Result<NewTask, FieldErrors> {
        let mut errors = FieldErrors::new();

        if trimmed(self.title.clone()).is_none() {
            errors.add("title", "Title is required");
        }
        if self.assigned_to.is_none() {
            errors.add("assignedTo", "Assigned user is required");
        }

        let changes = self.validate_fields(&mut errors);

        errors.finish(|| NewTask {
            title: changes.title.unwrap_or_default(),
            description: changes.description.flatten(),
            assigned_to: changes.assigned_to.unwrap_or(creator),
            created_by: creator,
            due_date: changes.due_date.flatten(),
        })
    }

    pub fn into_changes(self) -> Result<TaskChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let changes = self.validate_fields(&mut errors);
        errors.finish(|| changes)
    }

    fn validate_fields(self, errors: &mut FieldErrors) -> TaskChanges {
        let title = required_text(errors, "title", self.title, "Title is required");
        if let Some(title) = &title {
            check_max_len(errors, "title", title, TITLE_MAX_LEN, "Title cannot exceed 100 characters");
        }

        let description = self.description.map(trimmed);
        if let Some(Some(description)) = &description {
            check_max_len(
                errors,
                "description",
                description,
                DESCRIPTION_MAX_LEN,
                "Description cannot exceed 500 characters",
            );
        }

        TaskChanges {
            title,
            description,
            completed: self.completed,
            assigned_to: self.assigned_to,
            due_date: self.due_date,
        }
    }
}
