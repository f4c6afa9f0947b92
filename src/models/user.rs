use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{check_max_len, trimmed, FieldErrors};

pub const NAME_MAX_LEN: usize = 50;
pub const DESCRIPTION_MAX_LEN: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// A user profile. The password hash column is never selected into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub theme: Theme,
    pub language: String,
    pub currency: String,
    pub profile_picture: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight reference rendered in place of a raw user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Registration payload, produced by the external auth service.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: normalize_email(&email.into()),
            password_hash: password_hash.into(),
        }
    }
}

/// Profile update body. Password is not accepted here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub theme: Option<String>,
    pub language: Option<String>,
    pub currency: Option<String>,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub theme: Option<Theme>,
    pub language: Option<String>,
    pub currency: Option<String>,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// `local@domain.tld` with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    }
}

impl ProfileInput {
    pub fn into_changes(self) -> Result<ProfileChanges, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = trimmed(self.name);
        if let Some(name) = &name {
            check_max_len(&mut errors, "name", name, NAME_MAX_LEN, "Name cannot exceed 50 characters");
        }

        let email = self.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            if !is_valid_email(email) {
                errors.add("email", "Please enter a valid email");
            }
        }

        let theme = self.theme.as_deref().and_then(|raw| {
            let parsed = Theme::parse(raw);
            if parsed.is_none() {
                errors.add("theme", format!("'{}' is not a valid theme", raw));
            }
            parsed
        });

        let language = trimmed(self.language);
        if let Some(language) = &language {
            if !(2..=10).contains(&language.chars().count()) {
                errors.add("language", "Language must be between 2 and 10 characters");
            }
        }

        let currency = trimmed(self.currency).map(|c| c.to_uppercase());
        if let Some(currency) = &currency {
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                errors.add("currency", "Currency must be a three-letter code");
            }
        }

        let profile_picture = self.profile_picture.map(|p| p.trim().to_string());

        let description = self.description.map(|d| d.trim().to_string());
        if let Some(description) = &description {
            check_max_len(
                &mut errors,
                "description",
                description,
                DESCRIPTION_MAX_LEN,
                "Description cannot exceed 500 characters",
            );
        }

        errors.finish(|| ProfileChanges {
            name,
            email,
            theme,
            language,
            currency,
            profile_picture,
            description,
        })
    }
}
