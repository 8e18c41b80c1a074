//! Keywords and research areas repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::taxonomy::{CreateKeyword, CreateResearchArea, Keyword, ResearchArea},
};

#[derive(Clone)]
pub struct TaxonomyRepository {
    pool: Pool<Postgres>,
}

impl TaxonomyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_keywords(&self) -> AppResult<Vec<Keyword>> {
        let rows = sqlx::query_as::<_, Keyword>("SELECT id, name FROM keywords ORDER BY LOWER(name)")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create_keyword(&self, data: &CreateKeyword) -> AppResult<Keyword> {
        sqlx::query_as::<_, Keyword>("INSERT INTO keywords (name) VALUES ($1) RETURNING id, name")
            .bind(data.name.trim())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Keyword '{}'", data.name.trim())))
    }

    pub async fn delete_keyword(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM keywords WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Keyword {} not found", id)));
        }
        Ok(())
    }

    pub async fn list_research_areas(&self) -> AppResult<Vec<ResearchArea>> {
        let rows = sqlx::query_as::<_, ResearchArea>(
            "SELECT id, name, description FROM research_areas ORDER BY LOWER(name)",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_research_area(&self, data: &CreateResearchArea) -> AppResult<ResearchArea> {
        sqlx::query_as::<_, ResearchArea>(
            "INSERT INTO research_areas (name, description) VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(data.name.trim())
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, &format!("Research area '{}'", data.name.trim())))
    }

    pub async fn delete_research_area(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM research_areas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Research area {} not found", id)));
        }
        Ok(())
    }
}
