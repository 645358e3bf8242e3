//! Taggable
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Data access abstractions and SQLite implementations
//! - render: Tag link HTML
//! - commands: Entry points that sequence item writes with tag reconciliation

pub mod config;
pub mod domain;
pub mod repository;
pub mod render;
pub mod commands;

use std::path::Path;

use config::TaggableConfig;
use domain::DomainResult;
use repository::{init_db, ItemRepository, TagRepository};

/// Application state shared across commands
pub struct AppState {
    pub item_repo: ItemRepository,
    pub tag_repo: TagRepository,
}

impl AppState {
    /// Open (or create) the database at `db_path` and wire the repositories
    pub async fn open(db_path: &Path, config: TaggableConfig) -> DomainResult<Self> {
        let db_state = init_db(db_path, &config).await?;
        let item_repo = ItemRepository::new(db_state.connection(), &config)?;
        let tag_repo = TagRepository::new(db_state.connection(), config)?;

        Ok(Self { item_repo, tag_repo })
    }

    pub fn config(&self) -> &TaggableConfig {
        self.tag_repo.config()
    }
}
