//! Business logic services

pub mod authors;
pub mod cv_import;
pub mod merge;
pub mod publications;
pub mod taxonomy;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub authors: authors::AuthorsService,
    pub publications: publications::PublicationsService,
    pub taxonomy: taxonomy::TaxonomyService,
    pub cv_import: cv_import::CvImportService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        Self {
            authors: authors::AuthorsService::new(repository.clone(), config.matching.clone()),
            publications: publications::PublicationsService::new(repository.clone()),
            taxonomy: taxonomy::TaxonomyService::new(repository.clone()),
            cv_import: cv_import::CvImportService::new(
                repository.clone(),
                config.matching.clone(),
                config.owner.clone(),
            ),
            repository,
        }
    }
}
