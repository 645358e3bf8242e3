//! Tag Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Tag CRUD and name lookup.
//! Specialized operations are in separate modules:
//! - owner_tag: owner-tag links and read queries
//! - reconcile: tag-set synchronization
//! - tag_counter: usage counters
//! - tag_positioning: display order
//! - tag_suggest: autocomplete search

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::TaggableConfig;
use crate::domain::{Tag, DomainError, DomainResult};
use super::super::db::begin_write;
use super::super::sql::Sql;
use super::super::traits::{NamedRepository, Repository};
use super::owner_tag::unlink_tag_in;

/// SQLite implementation of Tag repository
#[derive(Clone)]
pub struct TagRepository {
    pub(crate) conn: Arc<Mutex<Connection>>,
    pub(crate) config: Arc<TaggableConfig>,
    pub(crate) sql: Arc<Sql>,
}

impl TagRepository {
    /// Fails with [`DomainError::Config`] when the linkage settings are incomplete
    pub fn new(conn: Arc<Mutex<Connection>>, config: TaggableConfig) -> DomainResult<Self> {
        config.validate()?;
        let sql = Sql::new(&config);
        Ok(Self {
            conn,
            config: Arc::new(config),
            sql: Arc::new(sql),
        })
    }

    pub fn config(&self) -> &TaggableConfig {
        &self.config
    }
}

/// Convert a database row to Tag
pub(super) fn row_to_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        count: row.get::<_, Option<i64>>(2)?,
    })
}

pub(super) fn find_by_id_in(conn: &Connection, sql: &Sql, id: i64) -> DomainResult<Option<Tag>> {
    Ok(conn
        .query_row(&sql.find_tag_by_id, params![id], row_to_tag)
        .optional()?)
}

pub(super) fn find_by_name_in(conn: &Connection, sql: &Sql, name: &str) -> DomainResult<Option<Tag>> {
    Ok(conn
        .query_row(&sql.find_tag_by_name, params![name], row_to_tag)
        .optional()?)
}

/// Insert a tag row, treating a name collision as "someone else created it".
///
/// Returns the tag and whether this call created it.
pub(super) fn insert_or_refetch(conn: &Connection, sql: &Sql, name: &str) -> DomainResult<(Tag, bool)> {
    match conn.execute(&sql.insert_tag, params![name]) {
        Ok(_) => {
            let id = conn.last_insert_rowid();
            let tag = find_by_id_in(conn, sql, id)?
                .ok_or_else(|| DomainError::Internal(format!("Tag {} vanished after insert", id)))?;
            log::info!("Created tag {:?} ({})", tag.name, tag.id);
            Ok((tag, true))
        }
        Err(e) => {
            let err = DomainError::from(e);
            if !err.is_constraint_violation() {
                return Err(err);
            }
            log::warn!("Tag {:?} was created concurrently, using existing row", name);
            let tag = find_by_name_in(conn, sql, name)?.ok_or(err)?;
            Ok((tag, false))
        }
    }
}

/// Exact-name lookup, creating the tag when missing
pub(super) fn resolve_in(conn: &Connection, sql: &Sql, name: &str) -> DomainResult<(Tag, bool)> {
    if let Some(tag) = find_by_name_in(conn, sql, name)? {
        return Ok((tag, false));
    }
    insert_or_refetch(conn, sql, name)
}

fn map_name_conflict(err: rusqlite::Error, name: &str) -> DomainError {
    let err = DomainError::from(err);
    if err.is_constraint_violation() {
        DomainError::Conflict(format!("Tag {:?} already exists", name))
    } else {
        err
    }
}

#[async_trait]
impl Repository<Tag> for TagRepository {
    async fn create(&self, entity: &Tag) -> DomainResult<Tag> {
        let conn = self.conn.lock().await;

        conn.execute(&self.sql.insert_tag, params![entity.name])
            .map_err(|e| map_name_conflict(e, &entity.name))?;

        let id = conn.last_insert_rowid();
        find_by_id_in(&conn, &self.sql, id)?
            .ok_or_else(|| DomainError::Internal(format!("Tag {} vanished after insert", id)))
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Tag>> {
        let conn = self.conn.lock().await;
        find_by_id_in(&conn, &self.sql, id)
    }

    async fn list(&self) -> DomainResult<Vec<Tag>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&self.sql.list_tags)?;
        let tags = stmt
            .query_map([], row_to_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Renames the tag; the counter is managed by reconciliation only
    async fn update(&self, entity: &Tag) -> DomainResult<Tag> {
        let conn = self.conn.lock().await;

        let changed = conn
            .execute(&self.sql.update_tag_name, params![entity.id, entity.name])
            .map_err(|e| map_name_conflict(e, &entity.name))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Tag {} not found", entity.id)));
        }

        find_by_id_in(&conn, &self.sql, entity.id)?
            .ok_or_else(|| DomainError::NotFound(format!("Tag {} not found", entity.id)))
    }

    /// Removes the tag's links from every junction table, then the tag row,
    /// in one transaction.
    ///
    /// Counters of other tags are unaffected.
    async fn delete(&self, id: i64) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = begin_write(&mut conn)?;

        let unlinked = unlink_tag_in(&tx, &self.sql, id)?;
        tx.execute(&self.sql.delete_tag, params![id])?;
        tx.commit()?;

        log::info!("Deleted tag {} ({} links removed)", id, unlinked);
        Ok(())
    }
}

#[async_trait]
impl NamedRepository<Tag> for TagRepository {
    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Tag>> {
        let conn = self.conn.lock().await;
        find_by_name_in(&conn, &self.sql, name)
    }

    async fn find_or_create(&self, name: &str) -> DomainResult<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("Tag name is empty".to_string()));
        }

        let conn = self.conn.lock().await;
        let (tag, _) = resolve_in(&conn, &self.sql, name)?;
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::init_db;
    use std::path::Path;

    async fn setup(config: TaggableConfig) -> TagRepository {
        let db = init_db(Path::new(":memory:"), &config).await.unwrap();
        TagRepository::new(db.connection(), config).unwrap()
    }

    #[tokio::test]
    async fn test_new_rejects_missing_junction() {
        let db = init_db(Path::new(":memory:"), &TaggableConfig::new("item_tags"))
            .await
            .unwrap();
        let result = TagRepository::new(db.connection(), TaggableConfig::new(""));
        assert!(matches!(result, Err(DomainError::Config(_))));
    }

    #[tokio::test]
    async fn test_create_defaults_count() {
        let repo = setup(TaggableConfig::new("item_tags")).await;

        let tag = repo.create(&Tag::new(0, "rust".to_string())).await.unwrap();
        assert!(tag.id > 0);
        assert_eq!(tag.count, Some(0));
    }

    #[tokio::test]
    async fn test_create_without_counter() {
        let repo = setup(TaggableConfig::new("item_tags").without_counter()).await;

        let tag = repo.create(&Tag::new(0, "rust".to_string())).await.unwrap();
        assert_eq!(tag.count, None);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let repo = setup(TaggableConfig::new("item_tags")).await;

        repo.create(&Tag::new(0, "rust".to_string())).await.unwrap();
        let err = repo.create(&Tag::new(0, "rust".to_string())).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_renames() {
        let repo = setup(TaggableConfig::new("item_tags")).await;

        let mut tag = repo.create(&Tag::new(0, "rsut".to_string())).await.unwrap();
        tag.name = "rust".to_string();
        let updated = repo.update(&tag).await.unwrap();
        assert_eq!(updated.name, "rust");

        assert!(repo.find_by_name("rsut").await.unwrap().is_none());
        assert!(matches!(
            repo.update(&Tag::new(999, "x".to_string())).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let repo = setup(TaggableConfig::new("item_tags")).await;

        for name in ["zeta", "alpha", "mu"] {
            repo.create(&Tag::new(0, name.to_string())).await.unwrap();
        }
        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["alpha", "mu", "zeta"]);
    }

    #[tokio::test]
    async fn test_find_or_create_reuses_existing() {
        let repo = setup(TaggableConfig::new("item_tags")).await;

        let first = repo.find_or_create("go").await.unwrap();
        let second = repo.find_or_create(" go ").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(repo.list().await.unwrap().len(), 1);

        assert!(matches!(
            repo.find_or_create("  ").await,
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_race_refetches_existing_row() {
        let repo = setup(TaggableConfig::new("item_tags")).await;
        let existing = repo.create(&Tag::new(0, "new".to_string())).await.unwrap();

        // Another writer inserted "new" between our lookup and our insert
        let conn = repo.conn.lock().await;
        let (tag, created) = insert_or_refetch(&conn, &repo.sql, "new").unwrap();
        assert!(!created);
        assert_eq!(tag.id, existing.id);
    }
}
