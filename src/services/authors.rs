//! Author service: CRUD, data-quality reports and merging

use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    matching::{
        detect_suspicious, find_duplicates, find_fragments, DuplicateCandidate, FragmentGroup,
        MatchingConfig, SuspiciousAuthor,
    },
    models::{
        author::{Author, AuthorWithCount, CreateAuthor, LinkedAuthor, UpdateAuthor},
        publication::AuthoredPublication,
    },
    repository::{authors::AuthorsRepository, Repository},
};

use super::merge::{MergePlan, MergeReport, MergeService};

/// One publication of an author together with its other authors
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorPublicationDetail {
    #[serde(flatten)]
    pub publication: AuthoredPublication,
    pub co_authors: Vec<LinkedAuthor>,
}

/// Everything known about an author, for review before update, merge or delete
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorCheck {
    pub author: Author,
    pub publications: Vec<AuthorPublicationDetail>,
}

/// Both sides of a pending merge and what it would do
#[derive(Debug, Clone)]
pub struct MergePreview {
    pub primary: Author,
    pub primary_publications: usize,
    pub secondary: Author,
    pub secondary_publications: usize,
    pub plan: MergePlan,
}

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
    matching: MatchingConfig,
    merger: MergeService<AuthorsRepository>,
}

impl AuthorsService {
    pub fn new(repository: Repository, matching: MatchingConfig) -> Self {
        Self {
            merger: MergeService::new(repository.authors.clone()),
            repository,
            matching,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<AuthorWithCount>> {
        self.repository.authors.list_with_counts().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.authors.create(data).await?;
        tracing::info!("Created author {} ({})", author.id, author.full_name());
        Ok(author)
    }

    pub async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        if data.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        let author = self.repository.authors.update(id, data).await?;
        tracing::info!("Updated author {} ({})", author.id, author.full_name());
        Ok(author)
    }

    /// Delete an author without links; refuses otherwise.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author {}", id);
        Ok(())
    }

    /// Delete an author and its links. Returns the number of links removed.
    pub async fn delete_with_links(&self, id: i32) -> AppResult<u64> {
        let removed = self.repository.authors.delete_with_links(id).await?;
        tracing::info!("Deleted author {} and {} publication link(s)", id, removed);
        Ok(removed)
    }

    pub async fn publications(&self, id: i32) -> AppResult<Vec<AuthoredPublication>> {
        self.repository.authors.get_by_id(id).await?;
        self.repository.authors.publications(id).await
    }

    /// Author details with every linked publication and its co-authors
    pub async fn check(&self, id: i32) -> AppResult<AuthorCheck> {
        let author = self.repository.authors.get_by_id(id).await?;
        let mut publications = Vec::new();
        for publication in self.repository.authors.publications(id).await? {
            let co_authors = self
                .repository
                .publications
                .authors(publication.publication_id)
                .await?
                .into_iter()
                .filter(|a| a.id != id)
                .collect();
            publications.push(AuthorPublicationDetail {
                publication,
                co_authors,
            });
        }
        Ok(AuthorCheck {
            author,
            publications,
        })
    }

    pub async fn duplicates(&self) -> AppResult<Vec<DuplicateCandidate>> {
        let authors = self.repository.authors.list().await?;
        let found = find_duplicates(&authors, &self.matching);
        tracing::info!(
            "Compared {} authors, found {} potential duplicate pair(s)",
            authors.len(),
            found.len()
        );
        Ok(found)
    }

    pub async fn suspicious(&self) -> AppResult<Vec<SuspiciousAuthor>> {
        let authors = self.repository.authors.list().await?;
        Ok(detect_suspicious(&authors))
    }

    pub async fn fragments(&self) -> AppResult<Vec<FragmentGroup>> {
        let authors = self.repository.authors.list().await?;
        Ok(find_fragments(&authors))
    }

    /// What `merge` would do, without changing anything
    pub async fn merge_preview(&self, primary_id: i32, secondary_id: i32) -> AppResult<MergePreview> {
        if primary_id == secondary_id {
            return Err(AppError::Validation(
                "Cannot merge an author into itself".to_string(),
            ));
        }
        let primary = self.repository.authors.get_by_id(primary_id).await?;
        let secondary = self.repository.authors.get_by_id(secondary_id).await?;
        let primary_links = self.repository.authors.links(primary_id).await?;
        let secondary_links = self.repository.authors.links(secondary_id).await?;

        Ok(MergePreview {
            plan: MergePlan::build(&primary_links, &secondary_links),
            primary_publications: primary_links.len(),
            secondary_publications: secondary_links.len(),
            primary,
            secondary,
        })
    }

    pub async fn merge(&self, primary_id: i32, secondary_id: i32) -> AppResult<MergeReport> {
        self.merger.merge(primary_id, secondary_id).await
    }
}
