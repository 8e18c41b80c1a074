//! Publications repository.
//!
//! Writes that touch a publication and its links run in one transaction.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, LinkedAuthor},
        publication::{
            AuthorLinkInput, CreatePublication, ImportAuthor, Publication, PublicationDetails,
            PublicationQuery, UpdatePublication,
        },
        taxonomy::{Keyword, ResearchArea},
    },
};

#[derive(Clone)]
pub struct PublicationsRepository {
    pool: Pool<Postgres>,
}

impl PublicationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List publications with optional filters, newest first
    pub async fn list(&self, query: &PublicationQuery) -> AppResult<Vec<Publication>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.publication_type.is_some() {
            conditions.push(format!("publication_type = ${}", idx));
            idx += 1;
        }
        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if query.year.is_some() {
            conditions.push(format!("year = ${}", idx));
            idx += 1;
        }
        if query.author_id.is_some() {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM publication_authors pa WHERE pa.publication_id = publications.id AND pa.author_id = ${})",
                idx
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let select_q = format!(
            "SELECT * FROM publications {} ORDER BY year DESC, title",
            where_clause
        );
        let mut builder = sqlx::query_as::<_, Publication>(&select_q);
        if let Some(t) = query.publication_type { builder = builder.bind(t); }
        if let Some(s) = query.status { builder = builder.bind(s); }
        if let Some(y) = query.year { builder = builder.bind(y); }
        if let Some(a) = query.author_id { builder = builder.bind(a); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Publication> {
        sqlx::query_as::<_, Publication>("SELECT * FROM publications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Publication {} not found", id)))
    }

    /// Publication with authors (in order), keywords and research areas
    pub async fn get_details(&self, id: i32) -> AppResult<PublicationDetails> {
        let publication = self.get_by_id(id).await?;
        Ok(PublicationDetails {
            authors: self.authors(id).await?,
            keywords: self.keywords(id).await?,
            research_areas: self.research_areas(id).await?,
            publication,
        })
    }

    /// Authors of a publication, ordered by position
    pub async fn authors(&self, publication_id: i32) -> AppResult<Vec<LinkedAuthor>> {
        let rows = sqlx::query_as::<_, LinkedAuthor>(
            r#"
            SELECT a.id, a.first_name, a.middle_name, a.last_name, a.is_owner,
                   pa.position, pa.is_corresponding, pa.equal_contribution
            FROM publication_authors pa
            JOIN authors a ON a.id = pa.author_id
            WHERE pa.publication_id = $1
            ORDER BY pa.position, a.last_name
            "#,
        )
        .bind(publication_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn keywords(&self, publication_id: i32) -> AppResult<Vec<Keyword>> {
        let rows = sqlx::query_as::<_, Keyword>(
            r#"
            SELECT k.id, k.name
            FROM publication_keywords pk
            JOIN keywords k ON k.id = pk.keyword_id
            WHERE pk.publication_id = $1
            ORDER BY k.name
            "#,
        )
        .bind(publication_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn research_areas(&self, publication_id: i32) -> AppResult<Vec<ResearchArea>> {
        let rows = sqlx::query_as::<_, ResearchArea>(
            r#"
            SELECT r.id, r.name, r.description
            FROM publication_research_areas pr
            JOIN research_areas r ON r.id = pr.research_area_id
            WHERE pr.publication_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(publication_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Titles of every stored publication, for CV matching
    pub async fn titles(&self) -> AppResult<Vec<(i32, String)>> {
        let rows = sqlx::query_as::<_, (i32, String)>("SELECT id, title FROM publications ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Create a publication with its author, keyword and research-area links
    pub async fn create(&self, data: &CreatePublication) -> AppResult<Publication> {
        let mut tx = self.pool.begin().await?;

        let publication = insert_publication(&mut tx, data).await?;
        replace_author_links(&mut tx, publication.id, &data.authors).await?;
        replace_keywords(&mut tx, publication.id, &data.keyword_ids).await?;
        replace_research_areas(&mut tx, publication.id, &data.research_area_ids).await?;

        tx.commit().await?;
        Ok(publication)
    }

    /// Create a publication and any authors it needs, in one transaction.
    /// Links follow the order of `authors`; the first author is
    /// corresponding. Returns the publication and the authors created.
    pub async fn create_imported(
        &self,
        data: &CreatePublication,
        authors: &[ImportAuthor],
    ) -> AppResult<(Publication, Vec<Author>)> {
        let mut tx = self.pool.begin().await?;

        let publication = insert_publication(&mut tx, data).await?;

        let mut created = Vec::new();
        let mut links = Vec::new();
        let mut seen = HashSet::new();
        for author in authors {
            let author_id = match author {
                ImportAuthor::Existing(id) => *id,
                ImportAuthor::New(new_author) => {
                    let row = sqlx::query_as::<_, Author>(
                        r#"
                        INSERT INTO authors (first_name, middle_name, last_name, is_owner)
                        VALUES ($1, $2, $3, $4)
                        RETURNING *
                        "#,
                    )
                    .bind(&new_author.first_name)
                    .bind(&new_author.middle_name)
                    .bind(&new_author.last_name)
                    .bind(new_author.is_owner)
                    .fetch_one(&mut *tx)
                    .await?;
                    let id = row.id;
                    created.push(row);
                    id
                }
            };
            if seen.insert(author_id) {
                links.push(AuthorLinkInput {
                    author_id,
                    is_corresponding: links.is_empty(),
                    equal_contribution: false,
                });
            }
        }
        replace_author_links(&mut tx, publication.id, &links).await?;

        tx.commit().await?;
        Ok((publication, created))
    }

    /// Update the given fields; present link lists replace the stored ones.
    pub async fn update(&self, id: i32, data: &UpdatePublication) -> AppResult<Publication> {
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_f {
            ($field:expr, $name:expr) => {
                if $field.is_some() { sets.push(format!("{} = ${}", $name, idx)); idx += 1; }
            };
        }

        add_f!(data.title, "title");
        add_f!(data.year, "year");
        add_f!(data.venue, "venue");
        add_f!(data.publication_type, "publication_type");
        add_f!(data.status, "status");
        add_f!(data.doi, "doi");
        add_f!(data.url, "url");
        add_f!(data.location, "location");
        add_f!(data.award, "award");
        add_f!(data.description, "description");
        add_f!(data.abstract_, "abstract");

        let query = format!(
            "UPDATE publications SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );
        let mut builder = sqlx::query_as::<_, Publication>(&query).bind(Utc::now());

        macro_rules! bind_f {
            ($field:expr) => {
                if let Some(ref val) = $field { builder = builder.bind(val); }
            };
        }

        bind_f!(data.title);
        bind_f!(data.year);
        bind_f!(data.venue);
        bind_f!(data.publication_type);
        bind_f!(data.status);
        bind_f!(data.doi);
        bind_f!(data.url);
        bind_f!(data.location);
        bind_f!(data.award);
        bind_f!(data.description);
        bind_f!(data.abstract_);

        let mut tx = self.pool.begin().await?;

        let publication = builder
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Publication {} not found", id)))?;

        if let Some(ref authors) = data.authors {
            replace_author_links(&mut tx, id, authors).await?;
        }
        if let Some(ref keyword_ids) = data.keyword_ids {
            replace_keywords(&mut tx, id, keyword_ids).await?;
        }
        if let Some(ref area_ids) = data.research_area_ids {
            replace_research_areas(&mut tx, id, area_ids).await?;
        }

        tx.commit().await?;
        Ok(publication)
    }

    /// Delete a publication; its links cascade.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Publication {} not found", id)));
        }
        Ok(())
    }
}

// =========================================================================
// TRANSACTION HELPERS
// =========================================================================

async fn insert_publication(conn: &mut PgConnection, data: &CreatePublication) -> AppResult<Publication> {
    let row = sqlx::query_as::<_, Publication>(
        r#"
        INSERT INTO publications (
            title, year, venue, publication_type, status,
            doi, url, location, award, description, abstract
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(data.title.trim())
    .bind(data.year)
    .bind(&data.venue)
    .bind(data.publication_type)
    .bind(data.status)
    .bind(&data.doi)
    .bind(&data.url)
    .bind(&data.location)
    .bind(&data.award)
    .bind(&data.description)
    .bind(&data.abstract_)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

/// Replace all author links of a publication; positions follow slice order.
async fn replace_author_links(
    conn: &mut PgConnection,
    publication_id: i32,
    authors: &[AuthorLinkInput],
) -> AppResult<()> {
    sqlx::query("DELETE FROM publication_authors WHERE publication_id = $1")
        .bind(publication_id)
        .execute(&mut *conn)
        .await?;

    for (idx, author) in authors.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO publication_authors
                (publication_id, author_id, position, is_corresponding, equal_contribution)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(publication_id)
        .bind(author.author_id)
        .bind(link_position(idx)?)
        .bind(author.is_corresponding)
        .bind(author.equal_contribution)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::from_write(e, "Publication author link"))?;
    }

    Ok(())
}

/// 1-based link position for the author at `idx`
fn link_position(idx: usize) -> AppResult<i16> {
    i16::try_from(idx + 1).map_err(|_| {
        AppError::Validation(format!("A publication can have at most {} authors", i16::MAX))
    })
}

async fn replace_keywords(conn: &mut PgConnection, publication_id: i32, ids: &[i32]) -> AppResult<()> {
    sqlx::query("DELETE FROM publication_keywords WHERE publication_id = $1")
        .bind(publication_id)
        .execute(&mut *conn)
        .await?;

    for keyword_id in ids {
        sqlx::query(
            "INSERT INTO publication_keywords (publication_id, keyword_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(publication_id)
        .bind(keyword_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn replace_research_areas(
    conn: &mut PgConnection,
    publication_id: i32,
    ids: &[i32],
) -> AppResult<()> {
    sqlx::query("DELETE FROM publication_research_areas WHERE publication_id = $1")
        .bind(publication_id)
        .execute(&mut *conn)
        .await?;

    for area_id in ids {
        sqlx::query(
            "INSERT INTO publication_research_areas (publication_id, research_area_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(publication_id)
        .bind(area_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_position_is_one_based() {
        assert_eq!(link_position(0).unwrap(), 1);
        assert_eq!(link_position(41).unwrap(), 42);
        assert_eq!(link_position(i16::MAX as usize - 1).unwrap(), i16::MAX);
    }

    #[test]
    fn test_link_position_overflow_is_validation_error() {
        assert!(matches!(
            link_position(i16::MAX as usize),
            Err(AppError::Validation(_))
        ));
    }
}
