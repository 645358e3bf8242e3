//! Tag Positioning Operations
//!
//! Display order of an owner's tags in the junction table. Reconciliation
//! keeps positions dense; these operations move single tags and repair
//! positions written by other tools or by an order column added after the fact.

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::domain::{DomainError, DomainResult};
use super::super::db::begin_write;
use super::super::sql::Sql;
use super::owner_tag::{linked_tags_in, LinkedTag};

/// Write positions `0..n-1` following `ordered`, skipping rows already in place
fn write_positions_in(conn: &Connection, sql: &Sql, owner_id: i64, ordered: &[LinkedTag]) -> DomainResult<usize> {
    let mut written = 0;
    for (index, linked) in ordered.iter().enumerate() {
        let position = index as i64;
        if linked.position != Some(position) {
            written += conn.execute(&sql.update_position, params![owner_id, linked.tag.id, position])?;
        }
    }
    Ok(written)
}

/// Trait for tag positioning operations
#[async_trait]
pub trait TagPositioningOperations {
    /// Move one of an owner's tags to `new_position` (clamped), shifting the others
    async fn move_owner_tag(&self, owner_id: i64, tag_id: i64, new_position: i64) -> DomainResult<()>;

    /// Rewrite an owner's positions to be sequential (0, 1, 2, ...) keeping their relative order
    async fn reindex_owner_tags(&self, owner_id: i64) -> DomainResult<usize>;

    /// Reindex every owner that has links; returns rows rewritten
    async fn reindex_all(&self) -> DomainResult<usize>;
}

#[async_trait]
impl TagPositioningOperations for super::tag_repo::TagRepository {
    async fn move_owner_tag(&self, owner_id: i64, tag_id: i64, new_position: i64) -> DomainResult<()> {
        if !self.config.order_enabled() {
            return Err(DomainError::Config("junction.order_column is not set".to_string()));
        }

        let mut conn = self.conn.lock().await;
        let tx = begin_write(&mut conn)?;

        let mut ordered = linked_tags_in(&tx, &self.sql, owner_id)?;
        let old_index = ordered
            .iter()
            .position(|linked| linked.tag.id == tag_id)
            .ok_or_else(|| {
                DomainError::NotFound(format!("Tag {} is not linked to owner {}", tag_id, owner_id))
            })?;

        let moving = ordered.remove(old_index);
        let new_index = new_position.clamp(0, ordered.len() as i64) as usize;
        ordered.insert(new_index, moving);

        write_positions_in(&tx, &self.sql, owner_id, &ordered)?;
        tx.commit()?;
        Ok(())
    }

    async fn reindex_owner_tags(&self, owner_id: i64) -> DomainResult<usize> {
        if !self.config.order_enabled() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().await;
        let tx = begin_write(&mut conn)?;

        let ordered = linked_tags_in(&tx, &self.sql, owner_id)?;
        let written = write_positions_in(&tx, &self.sql, owner_id, &ordered)?;
        tx.commit()?;
        Ok(written)
    }

    async fn reindex_all(&self) -> DomainResult<usize> {
        if !self.config.order_enabled() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().await;
        let tx = begin_write(&mut conn)?;

        let owner_ids = {
            let mut stmt = tx.prepare(&self.sql.linked_owners)?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };

        let mut written = 0;
        for owner_id in owner_ids {
            let ordered = linked_tags_in(&tx, &self.sql, owner_id)?;
            written += write_positions_in(&tx, &self.sql, owner_id, &ordered)?;
        }
        tx.commit()?;

        if written > 0 {
            log::info!("Reindexed {} tag positions", written);
        }
        Ok(written)
    }
}
