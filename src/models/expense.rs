use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{check_max_len, check_min, check_money, min_amount, optional_date, required_text, trimmed, FieldErrors};

pub const DESCRIPTION_MAX_LEN: usize = 200;

/// Fixed set of expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum ExpenseCategory {
    Groceries,
    Entertainment,
    Bills,
    Transport,
    Health,
    Shopping,
    Other,
}

/// Display metadata a client uses to render a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Groceries,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Bills,
        ExpenseCategory::Transport,
        ExpenseCategory::Health,
        ExpenseCategory::Shopping,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        self.info().id
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }

    pub fn info(&self) -> CategoryInfo {
        let (id, name, color, icon) = match self {
            ExpenseCategory::Groceries => ("groceries", "Groceries", "#10B981", "🛒"),
            ExpenseCategory::Entertainment => ("entertainment", "Entertainment", "#8B5CF6", "🎬"),
            ExpenseCategory::Bills => ("bills", "Bills", "#EF4444", "📄"),
            ExpenseCategory::Transport => ("transport", "Transport", "#F59E0B", "🚗"),
            ExpenseCategory::Health => ("health", "Health", "#06B6D4", "🏥"),
            ExpenseCategory::Shopping => ("shopping", "Shopping", "#EC4899", "🛍️"),
            ExpenseCategory::Other => ("other", "Other", "#6B7280", "📦"),
        };
        CategoryInfo { id, name, color, icon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub category: ExpenseCategory,
    pub description: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub category: ExpenseCategory,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub amount: Option<Decimal>,
    pub category: Option<ExpenseCategory>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl ExpenseInput {
    /// Validate a create request. `date` defaults to `now`.
    pub fn into_new(self, owner: Uuid, now: DateTime<Utc>) -> Result<NewExpense, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.amount.is_none() {
            errors.add("amount", "Amount is required");
        }
        if self.category.is_none() {
            errors.add("category", "Category is required");
        }
        let description = trimmed(self.description.clone());
        if description.is_none() {
            errors.add("description", "Description is required");
        }

        let changes = self.validate_fields(&mut errors);

        errors.finish(|| NewExpense {
            user_id: owner,
            amount: changes.amount.unwrap_or_default(),
            category: changes.category.unwrap_or(ExpenseCategory::Other),
            description: description.unwrap_or_default(),
            date: changes.date.unwrap_or(now),
        })
    }

    /// Validate an update request; only the fields present are checked.
    pub fn into_changes(self) -> Result<ExpenseChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let changes = self.validate_fields(&mut errors);
        errors.finish(|| changes)
    }

    fn validate_fields(self, errors: &mut FieldErrors) -> ExpenseChanges {
        if let Some(amount) = self.amount {
            check_min(errors, "amount", amount, min_amount(), "Amount must be greater than 0");
            check_money(errors, "amount", "Amount", amount);
        }

        let category = self.category.as_deref().and_then(|raw| {
            let parsed = ExpenseCategory::parse(raw);
            if parsed.is_none() {
                errors.add("category", format!("'{}' is not a valid category", raw));
            }
            parsed
        });

        let description = required_text(errors, "description", self.description, "Description is required");
        if let Some(description) = &description {
            check_max_len(
                errors,
                "description",
                description,
                DESCRIPTION_MAX_LEN,
                "Description cannot exceed 200 characters",
            );
        }

        ExpenseChanges {
            amount: self.amount,
            category,
            description,
            date: self.date,
        }
    }
}
