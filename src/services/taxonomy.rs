//! Keyword and research-area service

use validator::Validate;

use crate::{
    error::AppResult,
    models::taxonomy::{CreateKeyword, CreateResearchArea, Keyword, ResearchArea},
    repository::Repository,
};

#[derive(Clone)]
pub struct TaxonomyService {
    repository: Repository,
}

impl TaxonomyService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_keywords(&self) -> AppResult<Vec<Keyword>> {
        self.repository.taxonomy.list_keywords().await
    }

    pub async fn create_keyword(&self, data: &CreateKeyword) -> AppResult<Keyword> {
        data.validate()?;
        self.repository.taxonomy.create_keyword(data).await
    }

    pub async fn delete_keyword(&self, id: i32) -> AppResult<()> {
        self.repository.taxonomy.delete_keyword(id).await
    }

    pub async fn list_research_areas(&self) -> AppResult<Vec<ResearchArea>> {
        self.repository.taxonomy.list_research_areas().await
    }

    pub async fn create_research_area(&self, data: &CreateResearchArea) -> AppResult<ResearchArea> {
        data.validate()?;
        self.repository.taxonomy.create_research_area(data).await
    }

    pub async fn delete_research_area(&self, id: i32) -> AppResult<()> {
        self.repository.taxonomy.delete_research_area(id).await
    }
}
