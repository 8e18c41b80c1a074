//! Publication-Author junction model (N:M relationship)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Junction row linking a publication to an author. At most one row exists
/// per (publication_id, author_id); the schema enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PublicationAuthor {
    pub id: i32,
    pub publication_id: i32,
    pub author_id: i32,
    /// 1-based author order
    pub position: i16,
    pub is_corresponding: bool,
    pub equal_contribution: bool,
}

/// A link to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPublicationAuthor {
    pub publication_id: i32,
    pub author_id: i32,
    pub position: i16,
    pub is_corresponding: bool,
    pub equal_contribution: bool,
}

impl PublicationAuthor {
    /// The same link, re-pointed at another author with every flag kept.
    pub fn reassigned_to(&self, author_id: i32) -> NewPublicationAuthor {
        NewPublicationAuthor {
            publication_id: self.publication_id,
            author_id,
            position: self.position,
            is_corresponding: self.is_corresponding,
            equal_contribution: self.equal_contribution,
        }
    }
}
