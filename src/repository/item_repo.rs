//! Item Repository Implementation
//!
//! SQLite-backed implementation of Repository<Item>. Only the item's own
//! columns live here; its tags are handled by the tag repository.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::TaggableConfig;
use crate::domain::{Item, DomainError, DomainResult};
use super::sql::Sql;
use super::traits::Repository;

/// SQLite implementation of Item repository
#[derive(Clone)]
pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
    sql: Arc<Sql>,
}

impl ItemRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, config: &TaggableConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self {
            conn,
            sql: Arc::new(Sql::new(config)),
        })
    }

    /// Items linked to a tag, optionally narrowed by a predicate
    pub async fn find_with_tag(
        &self,
        tag_id: i64,
        filter: Option<&(dyn Fn(&Item) -> bool + Send + Sync)>,
    ) -> DomainResult<Vec<Item>> {
        let items = {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&self.sql.items_with_tag)?;
            let items = stmt
                .query_map(params![tag_id], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            items
        };

        Ok(match filter {
            Some(keep) => items.into_iter().filter(|item| keep(item)).collect(),
            None => items,
        })
    }
}

#[async_trait]
impl Repository<Item> for ItemRepository {
    async fn create(&self, entity: &Item) -> DomainResult<Item> {
        let conn = self.conn.lock().await;

        conn.execute(&self.sql.insert_item, params![entity.text])?;

        let mut item = entity.clone();
        item.id = conn.last_insert_rowid();
        Ok(item)
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Item>> {
        let conn = self.conn.lock().await;
        Ok(conn
            .query_row(&self.sql.find_item, params![id], row_to_item)
            .optional()?)
    }

    async fn list(&self) -> DomainResult<Vec<Item>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&self.sql.list_items)?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    async fn update(&self, entity: &Item) -> DomainResult<Item> {
        let conn = self.conn.lock().await;

        let changed = conn.execute(&self.sql.update_item, params![entity.id, entity.text])?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Item {} not found", entity.id)));
        }
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(&self.sql.delete_item, params![id])?;
        Ok(())
    }
}

/// Convert a database row to Item
fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    Ok(Item::new(row.get(0)?, row.get(1)?))
}
