//! In-memory merge store for tests. `begin` snapshots the state, `commit`
//! writes the snapshot back; a dropped transaction leaves the store as it
//! was.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::{Author, NewPublicationAuthor, PublicationAuthor},
    services::merge::{MergeStore, MergeTransaction},
};

#[derive(Debug, Clone, Default)]
struct State {
    authors: Vec<Author>,
    links: Vec<PublicationAuthor>,
    next_link_id: i32,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    /// 1-based index of the link insert that fails
    fail_on_insert: Arc<Mutex<Option<usize>>>,
    /// Author ids in the order `lock_author` saw them
    locks: Arc<Mutex<Vec<i32>>>,
}

impl MemoryStore {
    pub fn new(authors: Vec<Author>, links: Vec<PublicationAuthor>) -> Self {
        let next_link_id = links.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        Self {
            state: Arc::new(Mutex::new(State {
                authors,
                links,
                next_link_id,
            })),
            fail_on_insert: Arc::default(),
            locks: Arc::default(),
        }
    }

    pub fn fail_on_insert(&self, n: usize) {
        *self.fail_on_insert.lock().unwrap() = Some(n);
    }

    pub fn lock_order(&self) -> Vec<i32> {
        self.locks.lock().unwrap().clone()
    }

    pub fn links(&self) -> Vec<PublicationAuthor> {
        self.state.lock().unwrap().links.clone()
    }

    pub fn author(&self, id: i32) -> Option<Author> {
        self.state
            .lock()
            .unwrap()
            .authors
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }
}

pub struct MemoryTransaction {
    store: Arc<Mutex<State>>,
    working: State,
    inserts: usize,
    fail_on_insert: Option<usize>,
    locks: Arc<Mutex<Vec<i32>>>,
}

#[async_trait]
impl MergeStore for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> AppResult<MemoryTransaction> {
        Ok(MemoryTransaction {
            working: self.state.lock().unwrap().clone(),
            store: self.state.clone(),
            inserts: 0,
            fail_on_insert: *self.fail_on_insert.lock().unwrap(),
            locks: self.locks.clone(),
        })
    }
}

#[async_trait]
impl MergeTransaction for MemoryTransaction {
    async fn lock_author(&mut self, id: i32) -> AppResult<Option<Author>> {
        self.locks.lock().unwrap().push(id);
        Ok(self.working.authors.iter().find(|a| a.id == id).cloned())
    }

    async fn links_for_author(&mut self, author_id: i32) -> AppResult<Vec<PublicationAuthor>> {
        Ok(self
            .working
            .links
            .iter()
            .filter(|l| l.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn insert_link(&mut self, link: &NewPublicationAuthor) -> AppResult<()> {
        self.inserts += 1;
        if self.fail_on_insert == Some(self.inserts) {
            return Err(AppError::Internal(format!("injected failure on insert {}", self.inserts)));
        }
        let exists = self
            .working
            .links
            .iter()
            .any(|l| l.publication_id == link.publication_id && l.author_id == link.author_id);
        if exists {
            return Err(AppError::Conflict("Publication author link already exists".to_string()));
        }

        let id = self.working.next_link_id;
        self.working.next_link_id += 1;
        self.working.links.push(PublicationAuthor {
            id,
            publication_id: link.publication_id,
            author_id: link.author_id,
            position: link.position,
            is_corresponding: link.is_corresponding,
            equal_contribution: link.equal_contribution,
        });
        Ok(())
    }

    async fn delete_links_for_author(&mut self, author_id: i32) -> AppResult<u64> {
        let before = self.working.links.len();
        self.working.links.retain(|l| l.author_id != author_id);
        Ok((before - self.working.links.len()) as u64)
    }

    async fn delete_author(&mut self, author_id: i32) -> AppResult<()> {
        let before = self.working.authors.len();
        self.working.authors.retain(|a| a.id != author_id);
        if self.working.authors.len() == before {
            return Err(AppError::NotFound(format!("Author {} not found", author_id)));
        }
        Ok(())
    }

    async fn commit(self) -> AppResult<()> {
        *self.store.lock().unwrap() = self.working;
        Ok(())
    }
}
