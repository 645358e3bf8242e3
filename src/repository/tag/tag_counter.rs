//! Tag Counter Operations
//!
//! The optional denormalized usage counter on the tag table.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::TaggableConfig;
use crate::domain::{DomainError, DomainResult};
use super::super::sql::Sql;

/// Add `delta` to a tag's counter; no-op when counters are disabled
pub(super) fn adjust_count_in(
    conn: &Connection,
    sql: &Sql,
    config: &TaggableConfig,
    tag_id: i64,
    delta: i64,
) -> DomainResult<()> {
    if config.counts_enabled() {
        conn.execute(&sql.adjust_count, params![tag_id, delta])?;
    }
    Ok(())
}

/// Decrement the counters of every tag linked to `owner_id`.
/// Must run before the owner's links are deleted.
pub(super) fn decrement_for_owner_in(
    conn: &Connection,
    sql: &Sql,
    config: &TaggableConfig,
    owner_id: i64,
) -> DomainResult<()> {
    if config.counts_enabled() {
        conn.execute(&sql.decrement_counts_for_owner, params![owner_id])?;
    }
    Ok(())
}

pub(super) fn usage_count_in(
    conn: &Connection,
    sql: &Sql,
    config: &TaggableConfig,
    tag_id: i64,
) -> DomainResult<i64> {
    let not_found = || DomainError::NotFound(format!("Tag {} not found", tag_id));

    if config.counts_enabled() {
        return conn
            .query_row(&sql.read_count, params![tag_id], |row| row.get::<_, i64>(0))
            .optional()?
            .ok_or_else(not_found);
    }

    let exists: bool = conn.query_row(&sql.tag_exists, params![tag_id], |row| row.get(0))?;
    if !exists {
        return Err(not_found());
    }
    Ok(conn.query_row(&sql.count_links_for_tag, params![tag_id], |row| row.get(0))?)
}

/// Trait for tag usage counting
#[async_trait]
pub trait TagCounterOperations {
    /// Number of owners linked to the tag.
    ///
    /// Reads the counter column when enabled, otherwise counts junction rows.
    async fn usage_count(&self, tag_id: i64) -> DomainResult<i64>;

    /// Recompute every counter from the junction table; returns rows updated
    async fn recount_all(&self) -> DomainResult<usize>;
}

#[async_trait]
impl TagCounterOperations for super::tag_repo::TagRepository {
    async fn usage_count(&self, tag_id: i64) -> DomainResult<i64> {
        let conn = self.conn.lock().await;
        usage_count_in(&conn, &self.sql, &self.config, tag_id)
    }

    async fn recount_all(&self) -> DomainResult<usize> {
        if !self.config.counts_enabled() {
            return Ok(0);
        }
        let conn = self.conn.lock().await;
        let updated = conn.execute(&self.sql.recount_all, [])?;
        log::info!("Recounted {} tags", updated);
        Ok(updated)
    }
}
