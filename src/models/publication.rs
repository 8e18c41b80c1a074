//! Publication model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{
    author::LinkedAuthor,
    taxonomy::{Keyword, ResearchArea},
};

/// Kind of scholarly work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PublicationType {
    Journal,
    Conference,
    Article,
    Talk,
    Workshop,
    Poster,
    Book,
    Chapter,
    Other,
}

impl PublicationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationType::Journal => "journal",
            PublicationType::Conference => "conference",
            PublicationType::Article => "article",
            PublicationType::Talk => "talk",
            PublicationType::Workshop => "workshop",
            PublicationType::Poster => "poster",
            PublicationType::Book => "book",
            PublicationType::Chapter => "chapter",
            PublicationType::Other => "other",
        }
    }

    /// Map a CV section heading to a publication type.
    pub fn from_section_heading(heading: &str) -> Self {
        let heading = heading.to_lowercase();
        if heading.contains("journal") {
            PublicationType::Journal
        } else if heading.contains("conference proceedings") {
            PublicationType::Conference
        } else if heading.contains("non-peer") || heading.contains("blog") {
            PublicationType::Article
        } else if heading.contains("presentations") || heading.contains("talks") {
            PublicationType::Talk
        } else if heading.contains("roundtable") {
            PublicationType::Workshop
        } else if heading.contains("posters") {
            PublicationType::Poster
        } else {
            PublicationType::Other
        }
    }
}

/// Editorial status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    Published,
    InReview,
    InPreparation,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Published => "published",
            PublicationStatus::InReview => "in_review",
            PublicationStatus::InPreparation => "in_preparation",
        }
    }
}

/// Publication row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Publication {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub venue: Option<String>,
    pub publication_type: PublicationType,
    pub status: PublicationStatus,
    pub doi: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>,
    pub award: Option<String>,
    pub description: Option<String>,
    #[sqlx(rename = "abstract")]
    #[serde(rename = "abstract")]
    pub abstract_: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Publication with its authors and taxonomy
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicationDetails {
    #[serde(flatten)]
    pub publication: Publication,
    pub authors: Vec<LinkedAuthor>,
    pub keywords: Vec<Keyword>,
    pub research_areas: Vec<ResearchArea>,
}

/// Author reference in a create/update publication request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuthorLinkInput {
    pub author_id: i32,
    #[serde(default)]
    pub is_corresponding: bool,
    #[serde(default)]
    pub equal_contribution: bool,
}

/// Author of a publication being imported: an existing row or one to create
#[derive(Debug, Clone)]
pub enum ImportAuthor {
    Existing(i32),
    New(super::author::CreateAuthor),
}

/// Create publication request. Author order gives link positions.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePublication {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,
    pub venue: Option<String>,
    pub publication_type: PublicationType,
    pub status: PublicationStatus,
    pub doi: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>,
    pub award: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_: Option<String>,
    #[serde(default)]
    pub authors: Vec<AuthorLinkInput>,
    #[serde(default)]
    pub keyword_ids: Vec<i32>,
    #[serde(default)]
    pub research_area_ids: Vec<i32>,
}

/// Update publication request. When `authors`, `keyword_ids` or
/// `research_area_ids` is present the corresponding links are replaced.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePublication {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    pub venue: Option<String>,
    pub publication_type: Option<PublicationType>,
    pub status: Option<PublicationStatus>,
    pub doi: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>,
    pub award: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_: Option<String>,
    pub authors: Option<Vec<AuthorLinkInput>>,
    pub keyword_ids: Option<Vec<i32>>,
    pub research_area_ids: Option<Vec<i32>>,
}

/// Query parameters for publication listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PublicationQuery {
    pub publication_type: Option<PublicationType>,
    pub status: Option<PublicationStatus>,
    pub year: Option<i32>,
    /// Only publications linked to this author
    pub author_id: Option<i32>,
}

/// A publication as seen from one of its authors
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthoredPublication {
    pub publication_id: i32,
    pub title: String,
    pub year: i32,
    pub publication_type: PublicationType,
    pub position: i16,
    pub is_corresponding: bool,
    pub equal_contribution: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_heading_mapping() {
        let cases = [
            ("Peer-Reviewed Journal Articles", PublicationType::Journal),
            ("Peer-Reviewed Conference Proceedings", PublicationType::Conference),
            ("Non-peer-reviewed articles and blog posts", PublicationType::Article),
            ("Presentations Conference Talks", PublicationType::Talk),
            ("Roundtable Discussions", PublicationType::Workshop),
            ("Posters", PublicationType::Poster),
            ("Grants", PublicationType::Other),
        ];
        for (heading, expected) in cases {
            assert_eq!(PublicationType::from_section_heading(heading), expected, "{}", heading);
        }
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&PublicationStatus::InReview).unwrap();
        assert_eq!(json, "\"in_review\"");
        assert_eq!(PublicationStatus::InPreparation.as_str(), "in_preparation");
    }
}
