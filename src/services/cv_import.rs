//! CV import service

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    config::OwnerConfig,
    cv::{parse_cv, AuthorResolver, CvEntry, ImportPlan, MatchedEntry, Resolution},
    error::AppResult,
    matching::{normalize, MatchingConfig},
    models::{
        publication::{CreatePublication, ImportAuthor},
        Author,
    },
    repository::Repository,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CvImportRequest {
    /// CV text, sections separated by blank lines
    pub text: String,
    /// Year for entries that carry none; defaults to the current year
    pub default_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CvPreview {
    pub plan: ImportPlan,
    /// Entries that could not be parsed
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportedPublication {
    pub publication_id: i32,
    pub title: String,
    pub author_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FailedEntry {
    pub title: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ImportReport {
    pub matched: Vec<MatchedEntry>,
    pub created: Vec<ImportedPublication>,
    pub failed: Vec<FailedEntry>,
    pub authors_created: Vec<Author>,
    /// Author names that were not linked
    pub skipped_authors: Vec<String>,
    /// Entries that could not be parsed
    pub skipped_entries: Vec<String>,
}

#[derive(Clone)]
pub struct CvImportService {
    repository: Repository,
    matching: MatchingConfig,
    owner: OwnerConfig,
}

impl CvImportService {
    pub fn new(repository: Repository, matching: MatchingConfig, owner: OwnerConfig) -> Self {
        Self {
            repository,
            matching,
            owner,
        }
    }

    /// Parse a CV and match it against stored publications. Writes nothing.
    pub async fn preview(&self, text: &str, default_year: i32) -> AppResult<CvPreview> {
        let parsed = parse_cv(text, default_year);
        let existing = self.repository.publications.titles().await?;
        let plan = ImportPlan::build(parsed.entries, &existing, self.matching.title_match_threshold);

        tracing::info!(
            "CV preview: {} matched, {} new, {} unparseable",
            plan.matched.len(),
            plan.unmatched.len(),
            parsed.skipped.len()
        );
        Ok(CvPreview {
            plan,
            skipped: parsed.skipped,
        })
    }

    /// Import every CV entry with no stored counterpart. Each publication is
    /// written in its own transaction; a failed entry is reported and the
    /// rest continue.
    pub async fn import(&self, text: &str, default_year: i32) -> AppResult<ImportReport> {
        let preview = self.preview(text, default_year).await?;
        let authors = self.repository.authors.list().await?;
        let mut resolver = AuthorResolver::new(authors, &self.matching, &self.owner);

        let mut report = ImportReport {
            matched: preview.plan.matched,
            skipped_entries: preview.skipped,
            ..Default::default()
        };

        for entry in preview.plan.unmatched {
            let (authors, skipped) = resolve_authors(&resolver, &entry);
            report.skipped_authors.extend(skipped);

            let data = publication_from_entry(&entry);
            match self
                .repository
                .publications
                .create_imported(&data, &authors)
                .await
            {
                Ok((publication, created)) => {
                    tracing::info!(
                        "Imported publication {} '{}' with {} author(s), {} new",
                        publication.id,
                        publication.title,
                        authors.len(),
                        created.len()
                    );
                    report.created.push(ImportedPublication {
                        publication_id: publication.id,
                        title: publication.title,
                        author_count: authors.len(),
                    });
                    for author in created {
                        report.authors_created.push(author.clone());
                        resolver.remember(author);
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to import '{}': {}", entry.title, e);
                    report.failed.push(FailedEntry {
                        title: entry.title.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "CV import done: {} created, {} failed, {} new author(s)",
            report.created.len(),
            report.failed.len(),
            report.authors_created.len()
        );
        Ok(report)
    }
}

/// Resolve the authors of one entry, in order. Names resolving to the same
/// author, or to the same new author, are linked once.
fn resolve_authors(resolver: &AuthorResolver<'_>, entry: &CvEntry) -> (Vec<ImportAuthor>, Vec<String>) {
    let mut authors = Vec::new();
    let mut skipped = Vec::new();
    let mut existing = HashSet::new();
    let mut new_names = HashSet::new();

    for name in &entry.authors {
        match resolver.resolve(name) {
            Resolution::Existing { author_id, kind } => {
                tracing::debug!("'{}' -> author {} ({:?})", name.full_name(), author_id, kind);
                if existing.insert(author_id) {
                    authors.push(ImportAuthor::Existing(author_id));
                }
            }
            Resolution::Create(new_author) => {
                if new_names.insert(normalize(&name.full_name())) {
                    authors.push(ImportAuthor::New(new_author));
                }
            }
            Resolution::Skip(reason) => {
                tracing::warn!("Skipping author of '{}': {}", entry.title, reason);
                skipped.push(name.full_name());
            }
        }
    }

    (authors, skipped)
}

fn publication_from_entry(entry: &CvEntry) -> CreatePublication {
    let author_list = entry
        .authors
        .iter()
        .map(|a| a.full_name())
        .collect::<Vec<_>>()
        .join(", ");
    let mut description = format!("Imported from CV: {} ({}). {}.", author_list, entry.year, entry.title);
    if let Some(ref venue) = entry.venue {
        description.push(' ');
        description.push_str(venue);
    }

    CreatePublication {
        title: entry.title.clone(),
        year: entry.year,
        venue: entry.venue.clone(),
        publication_type: entry.publication_type,
        status: entry.status,
        doi: entry.doi.clone(),
        url: entry.url.clone(),
        location: entry.location.clone(),
        award: entry.award.clone(),
        description: Some(description),
        abstract_: None,
        authors: Vec::new(),
        keyword_ids: Vec::new(),
        research_area_ids: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cv::parse_entry, models::fixtures::author};

    fn entry() -> CvEntry {
        parse_entry(
            "❑Ion, M., Herbst, P., Ion, M., Oshkosh, Ko, I. (Oct. 2023). Surveying Instructors. PME-NA. Reno, NV.",
            "Peer-Reviewed Conference Proceedings",
            2024,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_authors_dedupes_and_skips() {
        let matching = MatchingConfig::default();
        let owner = OwnerConfig::default();
        let resolver = AuthorResolver::new(
            vec![author(1, "Mike", "Ion"), author(2, "Patricio", "Herbst")],
            &matching,
            &owner,
        );

        let (authors, skipped) = resolve_authors(&resolver, &entry());

        assert_eq!(authors.len(), 3);
        assert!(matches!(authors[0], ImportAuthor::Existing(1)));
        assert!(matches!(authors[1], ImportAuthor::Existing(2)));
        match &authors[2] {
            ImportAuthor::New(a) => assert_eq!(a.last_name, "Ko"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(skipped, vec!["Oshkosh".to_string()]);
    }

    #[test]
    fn test_publication_from_entry() {
        let data = publication_from_entry(&entry());
        assert_eq!(data.title, "Surveying Instructors");
        assert_eq!(data.year, 2023);
        assert_eq!(data.venue.as_deref(), Some("PME-NA"));
        assert_eq!(data.location.as_deref(), Some("Reno, NV"));
        assert!(data
            .description
            .as_deref()
            .unwrap()
            .starts_with("Imported from CV: M Ion, P Herbst"));
        assert!(data.authors.is_empty());
    }
}
