//! Owner-Tag Relationship Operations
//!
//! Read queries over the junction table and link cleanup when an owner or a
//! tag goes away.

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::domain::{OwnerTag, Tag, DomainResult};
use super::super::db::begin_write;
use super::super::sql::Sql;
use super::tag_counter::decrement_for_owner_in;
use super::tag_repo::row_to_tag;

/// A tag together with its stored position for one owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedTag {
    pub tag: Tag,
    /// `None` when the junction table has no order column
    pub position: Option<i64>,
}

/// Tags linked to `owner_id`, by position (tag key when unordered)
pub(super) fn linked_tags_in(conn: &Connection, sql: &Sql, owner_id: i64) -> DomainResult<Vec<LinkedTag>> {
    let mut stmt = conn.prepare(&sql.tags_for_owner)?;
    let linked = stmt
        .query_map(params![owner_id], |row| {
            Ok(LinkedTag {
                tag: row_to_tag(row)?,
                position: row.get::<_, Option<i64>>(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(linked)
}

/// Remove every link to `tag_id`, in the owner junction table and in each
/// shared one. Returns links removed.
pub(super) fn unlink_tag_in(conn: &Connection, sql: &Sql, tag_id: i64) -> DomainResult<usize> {
    let mut removed = conn.execute(&sql.delete_links_for_tag, params![tag_id])?;
    for statement in &sql.delete_shared_links_for_tag {
        removed += conn.execute(statement, params![tag_id])?;
    }
    Ok(removed)
}

/// Trait for owner-tag relationship operations
#[async_trait]
pub trait OwnerTagOperations {
    /// Tags of an owner in display order
    async fn get_tags_for_owner(&self, owner_id: i64) -> DomainResult<Vec<Tag>>;

    /// Tag names of an owner joined with the configured delimiter
    async fn tag_name_string(&self, owner_id: i64) -> DomainResult<String>;

    /// Raw junction rows of an owner, unordered
    async fn get_links_for_owner(&self, owner_id: i64) -> DomainResult<Vec<OwnerTag>>;

    /// Keys of all owners linked to a tag, unordered
    async fn get_owners_with_tag(&self, tag_id: i64) -> DomainResult<Vec<i64>>;

    /// Remove every link of an owner that is about to be deleted,
    /// decrementing the counters of the tags it used. Returns links removed.
    async fn cleanup_owner(&self, owner_id: i64) -> DomainResult<usize>;

    /// Remove every link to a tag, across all junction tables, for callers
    /// that delete the tag row themselves. Returns links removed.
    async fn cleanup_tag(&self, tag_id: i64) -> DomainResult<usize>;
}

#[async_trait]
impl OwnerTagOperations for super::tag_repo::TagRepository {
    async fn get_tags_for_owner(&self, owner_id: i64) -> DomainResult<Vec<Tag>> {
        let conn = self.conn.lock().await;
        let linked = linked_tags_in(&conn, &self.sql, owner_id)?;
        Ok(linked.into_iter().map(|l| l.tag).collect())
    }

    async fn tag_name_string(&self, owner_id: i64) -> DomainResult<String> {
        let tags = self.get_tags_for_owner(owner_id).await?;
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        Ok(names.join(&self.config.delimiter))
    }

    async fn get_links_for_owner(&self, owner_id: i64) -> DomainResult<Vec<OwnerTag>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&self.sql.links_for_owner)?;
        let links = stmt
            .query_map(params![owner_id], |row| {
                Ok(OwnerTag {
                    owner_id: row.get(0)?,
                    tag_id: row.get(1)?,
                    position: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    async fn get_owners_with_tag(&self, tag_id: i64) -> DomainResult<Vec<i64>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&self.sql.owners_with_tag)?;
        let owner_ids = stmt
            .query_map(params![tag_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(owner_ids)
    }

    async fn cleanup_owner(&self, owner_id: i64) -> DomainResult<usize> {
        let mut conn = self.conn.lock().await;
        let tx = begin_write(&mut conn)?;

        decrement_for_owner_in(&tx, &self.sql, &self.config, owner_id)?;
        let removed = tx.execute(&self.sql.delete_links_for_owner, params![owner_id])?;
        tx.commit()?;

        log::info!("Removed {} tag links of owner {}", removed, owner_id);
        Ok(removed)
    }

    async fn cleanup_tag(&self, tag_id: i64) -> DomainResult<usize> {
        let mut conn = self.conn.lock().await;
        let tx = begin_write(&mut conn)?;
        let removed = unlink_tag_in(&tx, &self.sql, tag_id)?;
        tx.commit()?;

        log::info!("Removed {} owner links of tag {}", removed, tag_id);
        Ok(removed)
    }
}
