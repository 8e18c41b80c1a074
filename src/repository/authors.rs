//! Authors repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorWithCount, CreateAuthor, UpdateAuthor},
        publication::AuthoredPublication,
        NewPublicationAuthor, PublicationAuthor,
    },
    services::merge::{MergeStore, MergeTransaction},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All authors, owner first, then by last and first name
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(
            "SELECT * FROM authors ORDER BY is_owner DESC, last_name, first_name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All authors with their publication counts
    pub async fn list_with_counts(&self) -> AppResult<Vec<AuthorWithCount>> {
        let rows = sqlx::query_as::<_, AuthorWithCount>(
            r#"
            SELECT a.*, COUNT(pa.id) AS publication_count
            FROM authors a
            LEFT JOIN publication_authors pa ON pa.author_id = a.id
            GROUP BY a.id
            ORDER BY a.is_owner DESC, a.last_name, a.first_name, a.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, middle_name, last_name, email, affiliation, is_owner)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.first_name.trim())
        .bind(data.middle_name.as_deref().map(str::trim).filter(|m| !m.is_empty()))
        .bind(data.last_name.trim())
        .bind(&data.email)
        .bind(&data.affiliation)
        .bind(data.is_owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update the given fields. An empty `middle_name` clears it.
    pub async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_f {
            ($field:expr, $name:expr) => {
                if $field.is_some() { sets.push(format!("{} = ${}", $name, idx)); idx += 1; }
            };
        }

        add_f!(data.first_name, "first_name");
        add_f!(data.middle_name, "middle_name");
        add_f!(data.last_name, "last_name");
        add_f!(data.email, "email");
        add_f!(data.affiliation, "affiliation");
        add_f!(data.is_owner, "is_owner");

        let query = format!(
            "UPDATE authors SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );
        let mut builder = sqlx::query_as::<_, Author>(&query).bind(Utc::now());

        if let Some(ref first) = data.first_name { builder = builder.bind(first.trim().to_string()); }
        if let Some(ref middle) = data.middle_name {
            let middle = Some(middle.trim().to_string()).filter(|m| !m.is_empty());
            builder = builder.bind(middle);
        }
        if let Some(ref last) = data.last_name { builder = builder.bind(last.trim().to_string()); }
        if let Some(ref email) = data.email { builder = builder.bind(email); }
        if let Some(ref affiliation) = data.affiliation { builder = builder.bind(affiliation); }
        if let Some(owner) = data.is_owner { builder = builder.bind(owner); }

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Delete an author that has no publication links.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let links = self.count_links(id).await?;
        if links > 0 {
            return Err(AppError::BusinessRule(format!(
                "Author {} is linked to {} publication(s); merge or unlink first",
                id, links
            )));
        }

        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }

    /// Delete an author and all of its links in one transaction.
    /// Returns the number of links removed.
    pub async fn delete_with_links(&self, id: i32) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM publication_authors WHERE author_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }

        tx.commit().await?;
        Ok(removed)
    }

    pub async fn count_links(&self, id: i32) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM publication_authors WHERE author_id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn links(&self, id: i32) -> AppResult<Vec<PublicationAuthor>> {
        let rows = sqlx::query_as::<_, PublicationAuthor>(
            "SELECT * FROM publication_authors WHERE author_id = $1 ORDER BY publication_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Publications of an author with the link flags, newest first
    pub async fn publications(&self, id: i32) -> AppResult<Vec<AuthoredPublication>> {
        let rows = sqlx::query_as::<_, AuthoredPublication>(
            r#"
            SELECT p.id AS publication_id, p.title, p.year, p.publication_type,
                   pa.position, pa.is_corresponding, pa.equal_contribution
            FROM publication_authors pa
            JOIN publications p ON p.id = pa.publication_id
            WHERE pa.author_id = $1
            ORDER BY p.year DESC, p.title
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// =========================================================================
// MERGE TRANSACTION
// =========================================================================

/// A merge running inside one PostgreSQL transaction
pub struct PgMergeTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl MergeStore for AuthorsRepository {
    type Tx = PgMergeTransaction;

    async fn begin(&self) -> AppResult<PgMergeTransaction> {
        Ok(PgMergeTransaction {
            tx: self.pool.begin().await?,
        })
    }
}

#[async_trait]
impl MergeTransaction for PgMergeTransaction {
    async fn lock_author(&mut self, id: i32) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn links_for_author(&mut self, author_id: i32) -> AppResult<Vec<PublicationAuthor>> {
        let rows = sqlx::query_as::<_, PublicationAuthor>(
            "SELECT * FROM publication_authors WHERE author_id = $1 ORDER BY publication_id",
        )
        .bind(author_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn insert_link(&mut self, link: &NewPublicationAuthor) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO publication_authors
                (publication_id, author_id, position, is_corresponding, equal_contribution)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(link.publication_id)
        .bind(link.author_id)
        .bind(link.position)
        .bind(link.is_corresponding)
        .bind(link.equal_contribution)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::from_write(e, "Publication author link"))?;
        Ok(())
    }

    async fn delete_links_for_author(&mut self, author_id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM publication_authors WHERE author_id = $1")
            .bind(author_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_author(&mut self, author_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(author_id)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", author_id)));
        }
        Ok(())
    }

    async fn commit(self) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
