//! Commands for Item operations
//!
//! Saving and deleting an item is sequenced explicitly with its tags:
//! reconcile after the item is stored, clean up links before it is removed.

use crate::domain::{validate_tag_text, Item, Taggable};
use crate::repository::tag::{OwnerTagOperations, ReconcileOperations, ReconcileReport};
use crate::repository::Repository;
use crate::AppState;

/// Fill the transient tag text from the stored tags
async fn with_tag_text(state: &AppState, mut item: Item) -> Result<Item, String> {
    let text = state
        .tag_repo
        .tag_name_string(item.owner_key())
        .await
        .map_err(|e| e.to_string())?;
    item.set_tag_text(text);
    Ok(item)
}

/// Create a new item, optionally tagged
pub async fn create_item(
    state: &AppState,
    text: String,
    tags: Option<String>,
) -> Result<Item, String> {
    let item = Item::with_tags(0, text, tags.unwrap_or_default());
    save_item(state, item).await
}

/// Insert (id 0) or update an item, then reconcile its tags
pub async fn save_item(state: &AppState, item: Item) -> Result<Item, String> {
    validate_tag_text(item.tag_text()).map_err(|e| e.to_string())?;

    let saved = if item.id == 0 {
        state.item_repo.create(&item).await
    } else {
        state.item_repo.update(&item).await
    }
    .map_err(|e| e.to_string())?;

    state
        .tag_repo
        .reconcile_text(saved.owner_key(), saved.tag_text())
        .await
        .map_err(|e| e.to_string())?;

    with_tag_text(state, saved).await
}

/// Load an item by ID, with its tag text
pub async fn load_item(state: &AppState, id: i64) -> Result<Option<Item>, String> {
    let found = state.item_repo.find_by_id(id).await.map_err(|e| e.to_string())?;
    match found {
        Some(item) => Ok(Some(with_tag_text(state, item).await?)),
        None => Ok(None),
    }
}

/// List all items, with their tag text
pub async fn list_items(state: &AppState) -> Result<Vec<Item>, String> {
    let items = state.item_repo.list().await.map_err(|e| e.to_string())?;

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(with_tag_text(state, item).await?);
    }
    Ok(out)
}

/// Replace an existing item's tags
pub async fn set_item_tags(
    state: &AppState,
    id: i64,
    tags: String,
) -> Result<ReconcileReport, String> {
    state
        .item_repo
        .find_by_id(id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Item {} not found", id))?;

    state
        .tag_repo
        .reconcile_text(id, &tags)
        .await
        .map_err(|e| e.to_string())
}

/// Delete an item after removing its tag links
pub async fn delete_item(state: &AppState, id: i64) -> Result<(), String> {
    state.tag_repo.cleanup_owner(id).await.map_err(|e| e.to_string())?;
    state.item_repo.delete(id).await.map_err(|e| e.to_string())
}
