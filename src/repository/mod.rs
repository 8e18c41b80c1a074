//! Repository layer for database operations

pub mod authors;
#[cfg(test)]
pub mod memory;
pub mod publications;
pub mod taxonomy;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub publications: publications::PublicationsRepository,
    pub taxonomy: taxonomy::TaxonomyRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            publications: publications::PublicationsRepository::new(pool.clone()),
            taxonomy: taxonomy::TaxonomyRepository::new(pool.clone()),
            pool,
        }
    }
}
