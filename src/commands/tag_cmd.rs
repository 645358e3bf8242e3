//! Commands for Tag operations
//!
//! Exposes tag reads, autocomplete, link rendering and maintenance.

use crate::domain::{Item, Tag};
use crate::render::{tag_link, tag_links};
use crate::repository::tag::{
    OwnerTagOperations, TagCounterOperations, TagPositioningOperations,
};
use crate::repository::{Repository, SearchableRepository};
use crate::AppState;

/// List all tags
pub async fn list_tags(state: &AppState) -> Result<Vec<Tag>, String> {
    state.tag_repo.list().await.map_err(|e| e.to_string())
}

/// Get tag by ID
pub async fn get_tag(state: &AppState, id: i64) -> Result<Option<Tag>, String> {
    state.tag_repo.find_by_id(id).await.map_err(|e| e.to_string())
}

/// Rename a tag
pub async fn rename_tag(state: &AppState, id: i64, name: String) -> Result<Tag, String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err("Tag name is empty".to_string());
    }
    state
        .tag_repo
        .update(&Tag::new(id, name))
        .await
        .map_err(|e| e.to_string())
}

/// Delete a tag and its links from every junction table, atomically
pub async fn delete_tag(state: &AppState, id: i64) -> Result<(), String> {
    state.tag_repo.delete(id).await.map_err(|e| e.to_string())
}

/// Tags of an item in display order
pub async fn get_item_tags(state: &AppState, item_id: i64) -> Result<Vec<Tag>, String> {
    state
        .tag_repo
        .get_tags_for_owner(item_id)
        .await
        .map_err(|e| e.to_string())
}

/// Items carrying a tag, optionally narrowed to those whose text contains `contains`
pub async fn get_items_by_tag(
    state: &AppState,
    tag_id: i64,
    contains: Option<String>,
) -> Result<Vec<Item>, String> {
    let result = match contains {
        Some(needle) => {
            let keep = move |item: &Item| item.text.contains(needle.as_str());
            state.item_repo.find_with_tag(tag_id, Some(&keep)).await
        }
        None => state.item_repo.find_with_tag(tag_id, None).await,
    };
    result.map_err(|e| e.to_string())
}

/// Number of items linked to a tag
pub async fn tag_usage(state: &AppState, tag_id: i64) -> Result<i64, String> {
    state.tag_repo.usage_count(tag_id).await.map_err(|e| e.to_string())
}

/// Autocomplete: JSON array of tag names matching `term`
pub async fn suggest_tags(state: &AppState, term: &str) -> Result<String, String> {
    let names: Vec<String> = state
        .tag_repo
        .search(term)
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|tag| tag.name)
        .collect();

    serde_json::to_string(&names).map_err(|e| e.to_string())
}

/// HTML links to each of an item's tags, joined with the configured glue
pub async fn tag_links_for_item(state: &AppState, item_id: i64) -> Result<String, String> {
    let tags = get_item_tags(state, item_id).await?;
    let config = state.config();

    Ok(tag_links(&tags, &config.link_glue, |tag| {
        tag_link(
            tag,
            &config.tag.link_route,
            &config.tag.key_column,
            &config.link_options,
        )
    }))
}

/// Move a tag within an item's tag order
pub async fn move_item_tag(
    state: &AppState,
    item_id: i64,
    tag_id: i64,
    new_position: i64,
) -> Result<(), String> {
    state
        .tag_repo
        .move_owner_tag(item_id, tag_id, new_position)
        .await
        .map_err(|e| e.to_string())
}

/// Rebuild dense positions for every item
pub async fn reindex_tags(state: &AppState) -> Result<usize, String> {
    state.tag_repo.reindex_all().await.map_err(|e| e.to_string())
}

/// Recompute every usage counter from the junction table
pub async fn recount_tags(state: &AppState) -> Result<usize, String> {
    state.tag_repo.recount_all().await.map_err(|e| e.to_string())
}
