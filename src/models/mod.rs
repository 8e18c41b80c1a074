//! Data models for Folio Curator

pub mod author;
pub mod publication;
pub mod publication_author;
pub mod taxonomy;

#[cfg(test)]
pub mod fixtures;

// Re-export commonly used types
pub use author::Author;
pub use publication::{Publication, PublicationStatus, PublicationType};
pub use publication_author::{NewPublicationAuthor, PublicationAuthor};
pub use taxonomy::{Keyword, ResearchArea};
