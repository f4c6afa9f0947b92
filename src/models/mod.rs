//! Document schemas: stored shapes, request inputs and their validation rules.

pub mod expense;
pub mod goal;
pub mod savings;
pub mod task;
pub mod user;

pub use expense::{CategoryInfo, Expense, ExpenseCategory, ExpenseChanges, ExpenseInput, NewExpense};
pub use goal::{Goal, GoalChanges, GoalInput, GoalView, NewGoal};
pub use savings::{NewSavings, Savings, SavingsChanges, SavingsInput};
pub use task::{NewTask, Task, TaskChanges, TaskInput, TaskView};
pub use user::{NewUser, ProfileChanges, ProfileInput, Theme, User, UserSummary};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Field-level validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure. The first reason recorded for a field wins.
    pub fn add(&mut self, field: &str, reason: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Human-readable summary of every failure.
    pub fn summary(&self) -> String {
        self.0.values().cloned().collect::<Vec<_>>().join("; ")
    }

    /// `Ok(value)` when nothing failed.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}

impl std::error::Error for FieldErrors {}

/// Trim a string field; blank strings count as absent.
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trim a required string field. Present but blank fails with `reason`.
pub(crate) fn required_text(errors: &mut FieldErrors, field: &str, value: Option<String>, reason: &str) -> Option<String> {
    let present = value.is_some();
    let value = trimmed(value);
    if present && value.is_none() {
        errors.add(field, reason);
    }
    value
}

pub(crate) fn check_min(errors: &mut FieldErrors, field: &str, value: Decimal, min: Decimal, reason: &str) {
    if value < min {
        errors.add(field, reason);
    }
}

pub(crate) fn check_max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize, reason: &str) {
    if value.chars().count() > max {
        errors.add(field, reason);
    }
}

/// Smallest accepted monetary amount (0.01).
pub fn min_amount() -> Decimal {
    Decimal::new(1, 2)
}

/// Largest amount a NUMERIC(14, 2) column holds.
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// Amounts are stored with two decimal places; anything finer or larger
/// would be rounded or overflow in the database.
pub(crate) fn check_money(errors: &mut FieldErrors, field: &str, label: &str, value: Decimal) {
    if value.normalize().scale() > 2 {
        errors.add(field, format!("{} cannot have more than 2 decimal places", label));
    }
    if value > max_amount() {
        errors.add(field, format!("{} cannot exceed {}", label, max_amount()));
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deserialize an optional date; `null` and absent are both `None`.
pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}', expected RFC 3339 or YYYY-MM-DD", raw))),
    }
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Use with `#[serde(default)]`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Nullable date: absent → `None`, `null` → `Some(None)`, value → `Some(Some(date))`.
pub(crate) fn nullable_date<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_date(deserializer).map(Some)
}
