use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{check_max_len, check_min, check_money, min_amount, optional_date, required_text, FieldErrors};

pub const DESCRIPTION_MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Savings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsInput {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSavings {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavingsChanges {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl SavingsInput {
    pub fn into_new(self, owner: Uuid, now: DateTime<Utc>) -> Result<NewSavings, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.amount.is_none() {
            errors.add("amount", "Amount is required");
        }
        let changes = self.validate_fields(&mut errors);
        if changes.description.is_none() {
            errors.add("description", "Description is required");
        }

        errors.finish(|| NewSavings {
            user_id: owner,
            amount: changes.amount.unwrap_or_default(),
            description: changes.description.unwrap_or_default(),
            date: changes.date.unwrap_or(now),
        })
    }

    pub fn into_changes(self) -> Result<SavingsChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let changes = self.validate_fields(&mut errors);
        errors.finish(|| changes)
    }

    fn validate_fields(self, errors: &mut FieldErrors) -> SavingsChanges {
        if let Some(amount) = self.amount {
            check_min(errors, "amount", amount, min_amount(), "Amount must be greater than 0");
            check_money(errors, "amount", "Amount", amount);
        }

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

        SavingsChanges {
            amount: self.amount,
            description,
            date: self.date,
        }
    }
}
