//! Detection of author rows that are probably not people

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Author;

static LEADING_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(\d{4}\)").expect("valid regex"));
static LEADING_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\((?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SuspicionReason {
    /// Looks like a date, venue or conference name
    NonPersonName,
    /// First or last name is empty
    MissingName,
    /// First name is `?` or a bare initial
    PlaceholderFirstName,
}

impl SuspicionReason {
    pub fn description(&self) -> &'static str {
        match self {
            SuspicionReason::NonPersonName => {
                "May be a date, venue, or conference name rather than an author"
            }
            SuspicionReason::MissingName => "Missing first or last name",
            SuspicionReason::PlaceholderFirstName => "First name is a placeholder or a bare initial",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SuspiciousAuthor {
    pub author_id: i32,
    pub display_name: String,
    pub reason: SuspicionReason,
    pub reason_text: String,
}

/// Flag authors for human review. One entry per (author, reason); nothing is
/// modified.
pub fn detect_suspicious(authors: &[Author]) -> Vec<SuspiciousAuthor> {
    let mut flagged = Vec::new();

    for author in authors {
        for reason in reasons_for(author) {
            flagged.push(SuspiciousAuthor {
                author_id: author.id,
                display_name: author.display_name(),
                reason,
                reason_text: reason.description().to_string(),
            });
        }
    }

    flagged
}

fn reasons_for(author: &Author) -> Vec<SuspicionReason> {
    let first = author.first_name.trim();
    let last = author.last_name.trim();
    let name = author.full_name();
    let mut reasons = Vec::new();

    let looks_like_venue = LEADING_YEAR.is_match(&name)
        || LEADING_MONTH.is_match(&name)
        || first.starts_with('(')
        || last.ends_with(')')
        || first.contains("Conference")
        || last.contains("Conference")
        || last.contains("America")
        || last.contains("Annual");
    if looks_like_venue {
        reasons.push(SuspicionReason::NonPersonName);
    }

    if first.is_empty() || last.is_empty() {
        reasons.push(SuspicionReason::MissingName);
    } else if first == "?" || first.chars().count() == 1 {
        reasons.push(SuspicionReason::PlaceholderFirstName);
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::author;

    #[test]
    fn test_flags_america_with_empty_first_name() {
        let flagged = detect_suspicious(&[author(9, "", "America")]);
        let reasons: Vec<SuspicionReason> = flagged.iter().map(|s| s.reason).collect();

        assert!(reasons.contains(&SuspicionReason::NonPersonName));
        assert!(reasons.contains(&SuspicionReason::MissingName));
        let venue = flagged
            .iter()
            .find(|s| s.reason == SuspicionReason::NonPersonName)
            .unwrap();
        assert_eq!(venue.author_id, 9);
        assert!(venue.reason_text.contains("conference name rather than an author"));
    }

    #[test]
    fn test_flags_date_fragments() {
        let flagged = detect_suspicious(&[
            author(1, "(2023)", "Teaching"),
            author(2, "(Oct.", "2023)"),
        ]);
        assert_eq!(
            flagged
                .iter()
                .filter(|s| s.reason == SuspicionReason::NonPersonName)
                .count(),
            2
        );
    }

    #[test]
    fn test_flags_conference_words() {
        let flagged = detect_suspicious(&[
            author(1, "Education", "North America Annual Conference"),
            author(2, "Research", "Conference"),
        ]);
        assert!(flagged.iter().all(|s| s.reason == SuspicionReason::NonPersonName));
        assert_eq!(flagged.len(), 2);
    }

    #[test]
    fn test_placeholder_first_names() {
        let flagged = detect_suspicious(&[author(1, "?", "Godfrey"), author(2, "M", "Ion")]);
        assert_eq!(flagged.len(), 2);
        assert!(flagged
            .iter()
            .all(|s| s.reason == SuspicionReason::PlaceholderFirstName));
    }

    #[test]
    fn test_real_people_pass() {
        let flagged = detect_suspicious(&[
            author(1, "Patricio", "Herbst"),
            author(2, "Amanda", "Brown"),
        ]);
        assert!(flagged.is_empty());
    }
}
