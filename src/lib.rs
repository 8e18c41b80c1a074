//! Folio Curator
//!
//! Publication and author maintenance for an academic portfolio: fuzzy
//! duplicate detection, transactional author merges, CV import, and a
//! REST JSON admin API over the same services.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod cv;
pub mod error;
pub mod matching;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
