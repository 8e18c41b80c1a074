//! Author merge: move every publication link from a secondary author to a
//! primary author, then delete the secondary. All steps run in one
//! transaction; an error anywhere leaves the database as it was.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Author, NewPublicationAuthor, PublicationAuthor},
};

/// Storage able to open a merge transaction
#[async_trait]
pub trait MergeStore: Send + Sync {
    type Tx: MergeTransaction;

    async fn begin(&self) -> AppResult<Self::Tx>;
}

/// Operations available inside a merge transaction. Dropping the value
/// without calling `commit` discards every change.
#[async_trait]
pub trait MergeTransaction: Send + Sized {
    /// Load an author, locking the row for the rest of the transaction.
    async fn lock_author(&mut self, id: i32) -> AppResult<Option<Author>>;
    async fn links_for_author(&mut self, author_id: i32) -> AppResult<Vec<PublicationAuthor>>;
    async fn insert_link(&mut self, link: &NewPublicationAuthor) -> AppResult<()>;
    async fn delete_links_for_author(&mut self, author_id: i32) -> AppResult<u64>;
    async fn delete_author(&mut self, author_id: i32) -> AppResult<()>;
    async fn commit(self) -> AppResult<()>;
}

/// How the secondary's links split between transfer and conflict
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// Links to re-create under the primary
    pub transferable: Vec<PublicationAuthor>,
    /// Links on publications the primary is already linked to; dropped
    pub conflicting: Vec<PublicationAuthor>,
}

impl MergePlan {
    /// Partition the secondary's links by whether the primary already has a
    /// link to the same publication.
    pub fn build(primary_links: &[PublicationAuthor], secondary_links: &[PublicationAuthor]) -> Self {
        let primary_publications: HashSet<i32> =
            primary_links.iter().map(|l| l.publication_id).collect();

        let (conflicting, transferable) = secondary_links
            .iter()
            .cloned()
            .partition(|l| primary_publications.contains(&l.publication_id));

        Self {
            transferable,
            conflicting,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MergeRequest {
    /// Author to keep
    pub primary_id: i32,
    /// Author to fold into the primary and delete
    pub secondary_id: i32,
}

/// One link touched by a merge
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MergedLink {
    pub publication_id: i32,
    pub position: i16,
    pub is_corresponding: bool,
    pub equal_contribution: bool,
}

impl From<&PublicationAuthor> for MergedLink {
    fn from(link: &PublicationAuthor) -> Self {
        Self {
            publication_id: link.publication_id,
            position: link.position,
            is_corresponding: link.is_corresponding,
            equal_contribution: link.equal_contribution,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MergeReport {
    pub primary_id: i32,
    pub secondary_id: i32,
    pub transferred_count: usize,
    pub conflict_count: usize,
    pub transferred: Vec<MergedLink>,
    /// Secondary links dropped because the primary already had the publication
    pub conflicts: Vec<MergedLink>,
}

/// Runs author merges against a `MergeStore`
#[derive(Clone)]
pub struct MergeService<S> {
    store: S,
}

impl<S: MergeStore> MergeService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn merge(&self, primary_id: i32, secondary_id: i32) -> AppResult<MergeReport> {
        if primary_id == secondary_id {
            return Err(AppError::Validation(
                "Cannot merge an author into itself".to_string(),
            ));
        }

        let mut tx = self.store.begin().await?;

        // Lock in ascending id order; opposite merges of one pair must not deadlock.
        let low = tx.lock_author(primary_id.min(secondary_id)).await?;
        let high = tx.lock_author(primary_id.max(secondary_id)).await?;
        let (primary, secondary) = if primary_id < secondary_id {
            (low, high)
        } else {
            (high, low)
        };
        let primary =
            primary.ok_or_else(|| AppError::NotFound(format!("Author {} not found", primary_id)))?;
        let secondary = secondary
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", secondary_id)))?;

        tracing::info!(
            "Merging author {} ({}) into {} ({})",
            secondary.id,
            secondary.full_name(),
            primary.id,
            primary.full_name()
        );

        let primary_links = tx.links_for_author(primary_id).await?;
        let secondary_links = tx.links_for_author(secondary_id).await?;
        let plan = MergePlan::build(&primary_links, &secondary_links);

        for link in &plan.transferable {
            tx.insert_link(&link.reassigned_to(primary_id)).await?;
            tracing::info!(
                publication_id = link.publication_id,
                position = link.position,
                "Transferred link from author {} to {}",
                secondary_id,
                primary_id
            );
        }
        for link in &plan.conflicting {
            tracing::warn!(
                publication_id = link.publication_id,
                "Publication already linked to author {}; dropping link of author {}",
                primary_id,
                secondary_id
            );
        }

        let removed = tx.delete_links_for_author(secondary_id).await?;
        tx.delete_author(secondary_id).await?;
        tx.commit().await?;

        tracing::info!(
            "Merge complete: {} transferred, {} conflicts, {} links removed, author {} deleted",
            plan.transferable.len(),
            plan.conflicting.len(),
            removed,
            secondary_id
        );

        Ok(MergeReport {
            primary_id,
            secondary_id,
            transferred_count: plan.transferable.len(),
            conflict_count: plan.conflicting.len(),
            transferred: plan.transferable.iter().map(MergedLink::from).collect(),
            conflicts: plan.conflicting.iter().map(MergedLink::from).collect(),
        })
    }
}
