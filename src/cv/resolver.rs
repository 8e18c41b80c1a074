//! Resolution of CV author names to author rows

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::OwnerConfig,
    matching::{duplicates::name_score, duplicates::same_last_name, normalize, MatchingConfig, ParsedName},
    models::{author::CreateAuthor, Author},
};

/// How a name was matched to an existing author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Full name, `f last` or `last f` key
    Exact,
    /// Initial-only name matched on last name and initial
    Initial,
    /// Comparator score at or above the author threshold
    Fuzzy,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Existing { author_id: i32, kind: MatchKind },
    Create(CreateAuthor),
    /// Not linked; carries the reason
    Skip(String),
}

/// Resolves parsed names against a snapshot of the authors table.
/// Authors created during an import are added with `remember`.
pub struct AuthorResolver<'a> {
    authors: Vec<Author>,
    keys: HashMap<String, i32>,
    matching: &'a MatchingConfig,
    owner: &'a OwnerConfig,
}

impl<'a> AuthorResolver<'a> {
    pub fn new(authors: Vec<Author>, matching: &'a MatchingConfig, owner: &'a OwnerConfig) -> Self {
        let mut resolver = Self {
            authors: Vec::with_capacity(authors.len()),
            keys: HashMap::new(),
            matching,
            owner,
        };
        for author in authors {
            resolver.remember(author);
        }
        resolver
    }

    /// Add an author to the snapshot. Earlier authors keep their keys.
    pub fn remember(&mut self, author: Author) {
        for key in author_keys(&author) {
            self.keys.entry(key).or_insert(author.id);
        }
        self.authors.push(author);
    }

    pub fn resolve(&self, name: &ParsedName) -> Resolution {
        // Initial-only names may use the `f last` forms; full names must match whole.
        let keys = if name.is_initial() {
            name.lookup_keys()
        } else {
            vec![normalize(&name.full_name())]
        };
        if let Some(id) = keys.iter().find_map(|k| self.keys.get(k)) {
            return Resolution::Existing {
                author_id: *id,
                kind: MatchKind::Exact,
            };
        }

        if name.is_initial() {
            let initial = name.first_initial();
            let by_initial = self.authors.iter().find(|a| {
                same_last_name(&a.last_name, &name.last)
                    && a.first_name.chars().next().map(|c| c.to_ascii_lowercase()) == initial
            });
            if let Some(author) = by_initial {
                return Resolution::Existing {
                    author_id: author.id,
                    kind: MatchKind::Initial,
                };
            }
        }

        let full = name.full_name();
        let fuzzy = self
            .authors
            .iter()
            .filter(|a| same_last_name(&a.last_name, &name.last))
            .map(|a| (a, name_score(&a.last_name, &a.full_name(), &name.last, &full, self.matching)))
            .filter(|(_, score)| *score >= self.matching.author_match_threshold)
            .max_by(|x, y| x.1.total_cmp(&y.1));
        if let Some((author, score)) = fuzzy {
            tracing::debug!("'{}' fuzzy-matched author {} (score {:.2})", full, author.id, score);
            return Resolution::Existing {
                author_id: author.id,
                kind: MatchKind::Fuzzy,
            };
        }

        if name.first.is_empty() {
            return Resolution::Skip(format!("'{}' has no first name", full));
        }

        Resolution::Create(CreateAuthor {
            first_name: name.first.clone(),
            middle_name: name.middle.clone(),
            last_name: name.last.clone(),
            email: None,
            affiliation: None,
            is_owner: self.owner.matches(&name.first, &name.last),
        })
    }
}

/// Keys an existing author can be found by
fn author_keys(author: &Author) -> Vec<String> {
    let mut keys = vec![normalize(&author.full_name())];
    let first = normalize(&author.first_name);
    if let Some(initial) = first.chars().next() {
        let last = normalize(&author.last_name);
        keys.push(format!("{} {}", initial, last));
        keys.push(format!("{} {}", last, initial));
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::author;

    fn owner() -> OwnerConfig {
        OwnerConfig {
            first_name: "Mike".to_string(),
            last_name: "Ion".to_string(),
        }
    }

    fn name(raw: &str) -> ParsedName {
        ParsedName::parse(raw).unwrap()
    }

    fn existing_id(resolution: Resolution) -> (i32, MatchKind) {
        match resolution {
            Resolution::Existing { author_id, kind } => (author_id, kind),
            other => panic!("expected existing author, got {:?}", other),
        }
    }

    #[test]
    fn test_exact_and_initial_keys() {
        let matching = MatchingConfig::default();
        let owner = owner();
        let resolver = AuthorResolver::new(
            vec![author(1, "Patricio", "Herbst"), author(2, "Mike", "Ion")],
            &matching,
            &owner,
        );

        assert_eq!(existing_id(resolver.resolve(&name("Patricio Herbst"))), (1, MatchKind::Exact));
        assert_eq!(existing_id(resolver.resolve(&name("Herbst, P."))), (1, MatchKind::Exact));
        assert_eq!(existing_id(resolver.resolve(&name("Ion, M."))), (2, MatchKind::Exact));
    }

    #[test]
    fn test_fuzzy_match_requires_same_last_name() {
        let matching = MatchingConfig::default();
        let owner = owner();
        let resolver = AuthorResolver::new(vec![author(1, "Amanda", "Brown")], &matching, &owner);

        assert_eq!(existing_id(resolver.resolve(&name("Amandah Brown"))), (1, MatchKind::Fuzzy));
        assert!(matches!(resolver.resolve(&name("Amanda Browne")), Resolution::Create(_)));
    }

    #[test]
    fn test_new_author_and_owner_flag() {
        let matching = MatchingConfig::default();
        let owner = owner();
        let resolver = AuthorResolver::new(vec![], &matching, &owner);

        match resolver.resolve(&name("Ion, M.")) {
            Resolution::Create(a) => {
                assert_eq!(a.first_name, "M");
                assert_eq!(a.last_name, "Ion");
                assert!(a.is_owner);
            }
            other => panic!("unexpected {:?}", other),
        }
        match resolver.resolve(&name("Brown, A.M.")) {
            Resolution::Create(a) => {
                assert_eq!(a.middle_name.as_deref(), Some("M"));
                assert!(!a.is_owner);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_surname_only_is_skipped() {
        let matching = MatchingConfig::default();
        let owner = owner();
        let resolver = AuthorResolver::new(vec![author(1, "Chris", "Margolis")], &matching, &owner);
        assert!(matches!(resolver.resolve(&name("Oshkosh")), Resolution::Skip(_)));
    }

    #[test]
    fn test_remembered_authors_are_reused() {
        let matching = MatchingConfig::default();
        let owner = owner();
        let mut resolver = AuthorResolver::new(vec![], &matching, &owner);
        resolver.remember(author(5, "Julia", "St. Goar"));
        assert_eq!(existing_id(resolver.resolve(&name("St. Goar, J."))), (5, MatchKind::Exact));
    }
}
