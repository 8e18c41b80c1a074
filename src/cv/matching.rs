//! Matching parsed CV entries against stored publications by title

use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use super::parser::CvEntry;

/// Lowercase words longer than three characters
fn title_words(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of the significant words of two titles. Titles
/// without significant words score 0.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = title_words(a);
    let b = title_words(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// A CV entry already present in the database
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchedEntry {
    pub entry: CvEntry,
    pub publication_id: i32,
    pub existing_title: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ImportPlan {
    pub matched: Vec<MatchedEntry>,
    /// Entries with no stored publication; these are imported
    pub unmatched: Vec<CvEntry>,
}

impl ImportPlan {
    /// Match every entry against `existing` (id, title) pairs. The best
    /// score above `threshold` is a match.
    pub fn build(entries: Vec<CvEntry>, existing: &[(i32, String)], threshold: f64) -> Self {
        let mut plan = ImportPlan::default();

        for entry in entries {
            let best = existing
                .iter()
                .map(|(id, title)| (id, title, title_similarity(&entry.title, title)))
                .max_by(|a, b| a.2.total_cmp(&b.2));

            match best {
                Some((id, title, score)) if score > threshold => {
                    tracing::debug!(
                        "CV entry '{}' matches publication {} (score {:.2})",
                        entry.title,
                        id,
                        score
                    );
                    plan.matched.push(MatchedEntry {
                        entry,
                        publication_id: *id,
                        existing_title: title.clone(),
                        score,
                    });
                }
                _ => plan.unmatched.push(entry),
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::parser::parse_entry;

    #[test]
    fn test_title_similarity() {
        assert_eq!(title_similarity("A Natural Language Approach", "a natural language approach"), 1.0);
        assert_eq!(title_similarity("On it", "Of us"), 0.0);
        let partial = title_similarity(
            "Measuring Tacit Mathematics Teaching Knowledge",
            "Measuring Mathematics Teaching Knowledge at Scale",
        );
        assert!((partial - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_splits_matched_and_unmatched() {
        let entries = vec![
            parse_entry(
                "❑Ion, M., Herbst, P. (Feb. 2022). Conceptions of the Derivative: A Natural Language Processing Approach. RUME Conference. Boston, MA.",
                "Peer-Reviewed Conference Proceedings",
                2024,
            )
            .unwrap(),
            parse_entry(
                "❑Ion, M. (Mar. 2018). Characterizing University Geometry Courses: An Interview-Based Approach. Graduate Student Conference. Ann Arbor, MI.",
                "Roundtable Discussions",
                2024,
            )
            .unwrap(),
        ];
        let existing = vec![
            (7, "Conceptions of the derivative: a natural language processing approach".to_string()),
            (8, "Writing Across the Curriculum".to_string()),
        ];

        let plan = ImportPlan::build(entries, &existing, 0.5);

        assert_eq!(plan.matched.len(), 1);
        assert_eq!(plan.matched[0].publication_id, 7);
        assert_eq!(plan.unmatched.len(), 1);
        assert!(plan.unmatched[0].title.starts_with("Characterizing"));
    }

    #[test]
    fn test_empty_database_imports_everything() {
        let entry = parse_entry("❑Ion, M. (2021). A Title Here. Venue.", "Talks", 2024).unwrap();
        let plan = ImportPlan::build(vec![entry], &[], 0.5);
        assert!(plan.matched.is_empty());
        assert_eq!(plan.unmatched.len(), 1);
    }
}
