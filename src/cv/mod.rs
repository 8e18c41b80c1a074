//! CV import: bibliography parsing, matching against stored publications
//! and author resolution. Everything here is pure; the service layer does
//! the database work.

pub mod matching;
pub mod parser;
pub mod resolver;

pub use matching::{title_similarity, ImportPlan, MatchedEntry};
pub use parser::{parse_cv, parse_entry, CvEntry, ParsedCv};
pub use resolver::{AuthorResolver, MatchKind, Resolution};
