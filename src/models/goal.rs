use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    check_max_len, check_min, check_money, min_amount, nullable, nullable_date, required_text, trimmed, FieldErrors,
    UserSummary,
};

pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub assigned_to: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: Option<UserSummary>,
    pub assigned_to: Vec<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn user_refs(&self) -> Vec<Uuid> {
        std::iter::once(self.created_by)
            .chain(self.assigned_to.iter().copied())
            .collect()
    }

    /// Resolve references; assignees that no longer exist are dropped.
    pub fn into_view(self, users: &HashMap<Uuid, UserSummary>) -> GoalView {
        GoalView {
            id: self.id,
            title: self.title,
            description: self.description,
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            due_date: self.due_date,
            created_by: users.get(&self.created_by).cloned(),
            assigned_to: self
                .assigned_to
                .iter()
                .filter_map(|id| users.get(id).cloned())
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalInput {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable_date")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub assigned_to: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub assigned_to: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub assigned_to: Option<Vec<Uuid>>,
}

fn dedup_preserving_order(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

impl GoalInput {
    pub fn into_new(self, creator: Uuid) -> Result<NewGoal, FieldErrors> {
        let mut errors = FieldErrors::new();

        if trimmed(self.title.clone()).is_none() {
            errors.add("title", "Title is required");
        }
        if self.target_amount.is_none() {
            errors.add("targetAmount", "Target amount is required");
        }

        let changes = self.validate_fields(&mut errors);

        errors.finish(|| NewGoal {
            title: changes.title.unwrap_or_default(),
            description: changes.description.flatten(),
            target_amount: changes.target_amount.unwrap_or_default(),
            current_amount: changes.current_amount.unwrap_or(Decimal::ZERO),
            due_date: changes.due_date.flatten(),
            created_by: creator,
            assigned_to: changes.assigned_to.unwrap_or_default(),
        })
    }

    pub fn into_changes(self) -> Result<GoalChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let changes = self.validate_fields(&mut errors);
        errors.finish(|| changes)
    }

    // currentAmount is not bounded by targetAmount.
    fn validate_fields(self, errors: &mut FieldErrors) -> GoalChanges {
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

        if let Some(target) = self.target_amount {
            check_min(errors, "targetAmount", target, min_amount(), "Target amount must be greater than 0");
            check_money(errors, "targetAmount", "Target amount", target);
        }
        if let Some(current) = self.current_amount {
            check_min(errors, "currentAmount", current, Decimal::ZERO, "Current amount cannot be negative");
            check_money(errors, "currentAmount", "Current amount", current);
        }

        GoalChanges {
            title,
            description,
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            due_date: self.due_date,
            assigned_to: self.assigned_to.map(dedup_preserving_order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_defaults_current_amount_and_assignees() {
        let input: GoalInput = serde_json::from_value(json!({"title": "Vacation", "targetAmount": 2000})).unwrap();
        let new = input.into_new(Uuid::new_v4()).unwrap();
        assert_eq!(new.current_amount, Decimal::ZERO);
        assert!(new.assigned_to.is_empty());
        assert_eq!(new.target_amount, Decimal::new(2000, 0));
    }

    #[test]
    fn update_rejects_blank_title_and_fractional_cents() {
        let input: GoalInput = serde_json::from_value(json!({"title": " ", "currentAmount": 0.125})).unwrap();
        let errors = input.into_changes().unwrap_err();
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("currentAmount"), Some("Current amount cannot have more than 2 decimal places"));
    }

    #[test]
    fn current_amount_may_exceed_target() {
        let input: GoalInput =
            serde_json::from_value(json!({"title": "Car", "targetAmount": 100, "currentAmount": 150})).unwrap();
        assert!(input.into_new(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn rejects_invalid_amounts() {
        let input: GoalInput =
            serde_json::from_value(json!({"title": "Car", "targetAmount": 0, "currentAmount": -1})).unwrap();
        let errors = input.into_new(Uuid::new_v4()).unwrap_err();
        assert!(errors.get("targetAmount").is_some());
        assert!(errors.get("currentAmount").is_some());
    }

    #[test]
    fn assignees_are_deduplicated() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let input: GoalInput = serde_json::from_value(json!({"assignedTo": [a, b, a]})).unwrap();
        let changes = input.into_changes().unwrap();
        assert_eq!(changes.assigned_to, Some(vec![a, b]));
    }
}
