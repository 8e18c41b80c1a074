//! Pairwise duplicate detection over the authors table

use serde::Serialize;
use utoipa::ToSchema;

use super::{similarity::similarity, MatchingConfig};
use crate::models::Author;

/// Two authors that may be the same person
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DuplicateCandidate {
    pub first_id: i32,
    pub first_name: String,
    pub second_id: i32,
    pub second_name: String,
    /// Comparator score (last-name bonus plus weighted full-name similarity)
    pub score: f64,
    pub full_name_similarity: f64,
    pub last_name_similarity: f64,
}

/// Score two authors: a flat bonus when last names are equal plus the
/// weighted similarity of the full names. The same record scores 1.0.
pub fn compare_authors(a: &Author, b: &Author, config: &MatchingConfig) -> f64 {
    if a.id == b.id {
        return 1.0;
    }
    name_score(&a.last_name, &a.full_name(), &b.last_name, &b.full_name(), config)
}

/// Comparator over raw name parts, shared with the importer's author resolution.
pub fn name_score(
    last_a: &str,
    full_a: &str,
    last_b: &str,
    full_b: &str,
    config: &MatchingConfig,
) -> f64 {
    let bonus = if same_last_name(last_a, last_b) {
        config.last_name_bonus
    } else {
        0.0
    };
    bonus + config.name_weight * similarity(full_a, full_b)
}

pub fn same_last_name(a: &str, b: &str) -> bool {
    let a = super::normalize(a);
    !a.is_empty() && a == super::normalize(b)
}

/// Compare every pair of authors (O(n^2)) and return those above either
/// threshold, best first.
pub fn find_duplicates(authors: &[Author], config: &MatchingConfig) -> Vec<DuplicateCandidate> {
    let mut candidates = Vec::new();

    for (i, a) in authors.iter().enumerate() {
        for b in &authors[i + 1..] {
            if a.id == b.id {
                continue;
            }
            let full_name_similarity = similarity(&a.full_name(), &b.full_name());
            let last_name_similarity = similarity(&a.last_name, &b.last_name);

            if full_name_similarity > config.full_name_threshold
                || last_name_similarity > config.last_name_threshold
            {
                candidates.push(DuplicateCandidate {
                    first_id: a.id,
                    first_name: a.full_name(),
                    second_id: b.id,
                    second_name: b.full_name(),
                    score: compare_authors(a, b, config),
                    full_name_similarity,
                    last_name_similarity,
                });
            }
        }
    }

    candidates.sort_by(|x, y| {
        y.score
            .total_cmp(&x.score)
            .then(y.full_name_similarity.total_cmp(&x.full_name_similarity))
            .then(x.first_id.cmp(&y.first_id))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::author;

    #[test]
    fn test_same_record_scores_one() {
        let a = author(1, "Mike", "Ion");
        assert_eq!(compare_authors(&a, &a, &MatchingConfig::default()), 1.0);
    }

    #[test]
    fn test_last_name_bonus() {
        let config = MatchingConfig::default();
        let a = author(1, "Mike", "Ion");
        let b = author(2, "M.", "Ion");
        let c = author(3, "Mike", "Lon");

        let with_bonus = compare_authors(&a, &b, &config);
        let expected = 0.5 + 0.5 * similarity("Mike Ion", "M. Ion");
        assert!((with_bonus - expected).abs() < 1e-9);

        let without_bonus = compare_authors(&a, &c, &config);
        assert!(without_bonus < 0.5);
    }

    #[test]
    fn test_find_duplicates_ranks_and_filters() {
        let authors = vec![
            author(1, "Mike", "Ion"),
            author(2, "Patricio", "Herbst"),
            author(3, "Amanda", "Brown"),
            author(4, "Mike", "Ionn"),
            author(5, "Amanda", "Browne"),
        ];
        let found = find_duplicates(&authors, &MatchingConfig::default());

        let pairs: Vec<(i32, i32)> = found.iter().map(|c| (c.first_id, c.second_id)).collect();
        assert!(pairs.contains(&(1, 4)));
        assert!(pairs.contains(&(3, 5)));
        assert!(!pairs.iter().any(|&(a, b)| a == 2 || b == 2));

        for window in found.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[test]
    fn test_identical_names_on_distinct_records_are_reported() {
        let authors = vec![author(1, "Pat", "Herbst"), author(2, "Pat", "Herbst")];
        let found = find_duplicates(&authors, &MatchingConfig::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].score, 1.0);
    }

    #[test]
    fn test_thresholds_come_from_config() {
        let authors = vec![author(1, "Mike", "Ion"), author(2, "Mike", "Ionn")];
        let strict = MatchingConfig {
            full_name_threshold: 0.99,
            last_name_threshold: 0.99,
            ..MatchingConfig::default()
        };
        assert!(find_duplicates(&authors, &strict).is_empty());
    }
}
