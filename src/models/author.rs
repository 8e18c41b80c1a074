//! Author model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    /// May be empty when only a surname is known
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub affiliation: Option<String>,
    /// Marks the portfolio owner
    pub is_owner: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Author {
    /// "First Middle Last" with empty parts skipped.
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, self.middle_name.as_deref(), &self.last_name)
    }

    /// Name for reports; empty parts are shown as `(empty)`.
    pub fn display_name(&self) -> String {
        let first = if self.first_name.trim().is_empty() {
            "(empty)"
        } else {
            self.first_name.trim()
        };
        let last = if self.last_name.trim().is_empty() {
            "(empty)"
        } else {
            self.last_name.trim()
        };
        full_name(first, self.middle_name.as_deref(), last)
    }
}

/// Join name parts with single spaces, skipping empty ones.
pub fn full_name(first: &str, middle: Option<&str>, last: &str) -> String {
    [first, middle.unwrap_or(""), last]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Author with its link flags, as listed on a publication
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LinkedAuthor {
    pub id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub is_owner: bool,
    pub position: i16,
    pub is_corresponding: bool,
    pub equal_contribution: bool,
}

/// Create author request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[serde(default)]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub last_name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub affiliation: Option<String>,
    #[serde(default)]
    pub is_owner: bool,
}

/// Update author request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    pub first_name: Option<String>,
    /// `Some("")` clears the middle name
    pub middle_name: Option<String>,
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub affiliation: Option<String>,
    pub is_owner: Option<bool>,
}

impl UpdateAuthor {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.middle_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.affiliation.is_none()
            && self.is_owner.is_none()
    }
}

/// Author with the number of publications linked to it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthorWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub author: Author,
    pub publication_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::author;

    #[test]
    fn test_full_name_skips_empty_parts() {
        let mut a = author(1, "Amanda", "Brown");
        a.middle_name = Some("M".to_string());
        assert_eq!(a.full_name(), "Amanda M Brown");
        assert_eq!(author(2, "", "Oshkosh").full_name(), "Oshkosh");
    }

    #[test]
    fn test_display_name_marks_empty_parts() {
        assert_eq!(author(3, "", "America").display_name(), "(empty) America");
    }

    #[test]
    fn test_create_author_requires_last_name() {
        let req = CreateAuthor {
            first_name: "Pat".to_string(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
