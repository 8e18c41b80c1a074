//! Fragmented author records: initial-only or surname-only entries that
//! usually belong to a full-name author.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use super::similarity::normalize;
use crate::models::Author;

static INITIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]\.?$").expect("valid regex"));
static DOUBLE_INITIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]\.?[A-Z]\.?$").expect("valid regex"));

/// A fragment and the full-name authors it could be merged into
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FragmentSuggestion {
    pub fragment: Author,
    pub candidates: Vec<Author>,
}

/// Fragments sharing a (normalized) last name
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FragmentGroup {
    pub last_name: String,
    pub fragments: Vec<FragmentSuggestion>,
}

/// Whether an author record looks like a name fragment.
pub fn is_fragment(author: &Author) -> bool {
    let first = author.first_name.trim();
    let last = author.last_name.trim();
    let probe = if first.is_empty() { last } else { first };

    INITIAL.is_match(probe)
        || DOUBLE_INITIAL.is_match(probe)
        || (first.is_empty() && !last.is_empty())
}

/// Full-name authors a fragment may stand for: same last name, a real first
/// name, and for initial fragments a first or middle name starting with
/// that initial.
pub fn full_name_candidates<'a>(fragment: &Author, authors: &'a [Author]) -> Vec<&'a Author> {
    let last = normalize(&fragment.last_name);
    let initial = fragment
        .first_name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase());

    authors
        .iter()
        .filter(|a| a.id != fragment.id)
        .filter(|a| !last.is_empty() && normalize(&a.last_name) == last)
        .filter(|a| a.first_name.trim().trim_end_matches('.').chars().count() > 1)
        .filter(|a| match initial {
            None => true,
            Some(i) => {
                let starts = |s: &str| s.trim().to_lowercase().starts_with(i);
                starts(a.first_name.as_str()) || a.middle_name.as_deref().map(starts).unwrap_or(false)
            }
        })
        .collect()
}

/// Group fragments by last name, each with its merge candidates.
pub fn find_fragments(authors: &[Author]) -> Vec<FragmentGroup> {
    let mut groups: BTreeMap<String, Vec<FragmentSuggestion>> = BTreeMap::new();

    for author in authors.iter().filter(|a| is_fragment(a)) {
        let candidates = full_name_candidates(author, authors)
            .into_iter()
            .cloned()
            .collect();
        groups
            .entry(author.last_name.trim().to_lowercase())
            .or_default()
            .push(FragmentSuggestion {
                fragment: author.clone(),
                candidates,
            });
    }

    groups
        .into_iter()
        .map(|(last_name, fragments)| FragmentGroup {
            last_name,
            fragments,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::author;

    #[test]
    fn test_fragment_patterns() {
        assert!(is_fragment(&author(1, "M.", "Ion")));
        assert!(is_fragment(&author(2, "AM", "Brown")));
        assert!(is_fragment(&author(3, "", "Herbst")));
        assert!(!is_fragment(&author(4, "Mike", "Ion")));
    }

    #[test]
    fn test_initial_fragment_candidates() {
        let authors = vec![
            author(1, "M.", "Ion"),
            author(2, "Mike", "Ion"),
            author(3, "Patricio", "Ion"),
            author(4, "Mike", "Herbst"),
        ];
        let ids: Vec<i32> = full_name_candidates(&authors[0], &authors)
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_surname_only_fragment_candidates() {
        let authors = vec![
            author(1, "", "Herbst"),
            author(2, "Pat", "Herbst"),
            author(3, "P", "Herbst"),
        ];
        let ids: Vec<i32> = full_name_candidates(&authors[0], &authors)
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_groups_by_last_name() {
        let authors = vec![
            author(1, "C.", "Margolis"),
            author(2, "", "margolis"),
            author(3, "Chris", "Margolis"),
            author(4, "P.", "Herbst"),
        ];
        let groups = find_fragments(&authors);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].last_name, "herbst");
        assert_eq!(groups[1].last_name, "margolis");
        assert_eq!(groups[1].fragments.len(), 2);
        assert!(groups[1]
            .fragments
            .iter()
            .all(|f| f.candidates.iter().any(|c| c.id == 3)));
        assert!(groups[0].fragments[0].candidates.is_empty());
    }
}
