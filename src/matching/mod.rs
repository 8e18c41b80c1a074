//! Author matching: name similarity, name parsing, duplicate detection,
//! suspicious-entry detection and fragment lookup.
//!
//! Everything here is pure and synchronous; callers load authors and hand
//! them in as slices.

pub mod duplicates;
pub mod fragments;
pub mod names;
pub mod similarity;
pub mod suspicious;

use serde::{Deserialize, Serialize};

pub use duplicates::{compare_authors, find_duplicates, DuplicateCandidate};
pub use fragments::{find_fragments, FragmentGroup, FragmentSuggestion};
pub use names::ParsedName;
pub use similarity::{normalize, similarity};
pub use suspicious::{detect_suspicious, SuspiciousAuthor, SuspicionReason};

/// Full-name similarity above which a pair is reported as a potential duplicate.
pub const DEFAULT_FULL_NAME_THRESHOLD: f64 = 0.7;

/// Last-name similarity above which a pair is reported as a potential duplicate.
pub const DEFAULT_LAST_NAME_THRESHOLD: f64 = 0.8;

/// Flat score added by the pair comparator when last names are equal.
pub const DEFAULT_LAST_NAME_BONUS: f64 = 0.5;

/// Weight of the full-name similarity in the pair comparator.
pub const DEFAULT_NAME_WEIGHT: f64 = 0.5;

/// Title Jaccard score above which a CV entry matches a stored publication.
pub const DEFAULT_TITLE_MATCH_THRESHOLD: f64 = 0.5;

/// Comparator score at or above which an imported author name is resolved
/// to an existing author instead of creating a new one.
pub const DEFAULT_AUTHOR_MATCH_THRESHOLD: f64 = 0.85;

/// Tunable matching policy. The defaults were tuned by hand on a single
/// researcher's co-author list; other datasets may need different values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub full_name_threshold: f64,
    pub last_name_threshold: f64,
    pub last_name_bonus: f64,
    pub name_weight: f64,
    pub title_match_threshold: f64,
    pub author_match_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            full_name_threshold: DEFAULT_FULL_NAME_THRESHOLD,
            last_name_threshold: DEFAULT_LAST_NAME_THRESHOLD,
            last_name_bonus: DEFAULT_LAST_NAME_BONUS,
            name_weight: DEFAULT_NAME_WEIGHT,
            title_match_threshold: DEFAULT_TITLE_MATCH_THRESHOLD,
            author_match_threshold: DEFAULT_AUTHOR_MATCH_THRESHOLD,
        }
    }
}
