//! Publication service

use std::collections::HashSet;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::publication::{
        AuthorLinkInput, CreatePublication, Publication, PublicationDetails, PublicationQuery,
        UpdatePublication,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct PublicationsService {
    repository: Repository,
}

impl PublicationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &PublicationQuery) -> AppResult<Vec<Publication>> {
        self.repository.publications.list(query).await
    }

    pub async fn get_details(&self, id: i32) -> AppResult<PublicationDetails> {
        self.repository.publications.get_details(id).await
    }

    pub async fn create(&self, data: &CreatePublication) -> AppResult<PublicationDetails> {
        data.validate()?;
        check_distinct_authors(&data.authors)?;
        let publication = self.repository.publications.create(data).await?;
        tracing::info!("Created publication {} '{}'", publication.id, publication.title);
        self.repository.publications.get_details(publication.id).await
    }

    pub async fn update(&self, id: i32, data: &UpdatePublication) -> AppResult<PublicationDetails> {
        data.validate()?;
        if let Some(ref authors) = data.authors {
            check_distinct_authors(authors)?;
        }
        let publication = self.repository.publications.update(id, data).await?;
        tracing::info!("Updated publication {} '{}'", publication.id, publication.title);
        self.repository.publications.get_details(id).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.publications.delete(id).await?;
        tracing::info!("Deleted publication {}", id);
        Ok(())
    }
}

/// An author may appear at most once on a publication.
fn check_distinct_authors(authors: &[AuthorLinkInput]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for link in authors {
        if !seen.insert(link.author_id) {
            return Err(AppError::Validation(format!(
                "Author {} is listed more than once",
                link.author_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(author_id: i32) -> AuthorLinkInput {
        AuthorLinkInput {
            author_id,
            is_corresponding: false,
            equal_contribution: false,
        }
    }

    #[test]
    fn test_repeated_author_rejected() {
        assert!(check_distinct_authors(&[link(1), link(2)]).is_ok());
        assert!(matches!(
            check_distinct_authors(&[link(1), link(2), link(1)]),
            Err(AppError::Validation(_))
        ));
    }
}
