use std::path::Path;

use super::*;
use crate::config::TaggableConfig;
use crate::domain::Item;
use crate::AppState;

async fn state() -> AppState {
    AppState::open(Path::new(":memory:"), TaggableConfig::new("item_tags"))
        .await
        .unwrap()
}

fn names(tags: &[crate::domain::Tag]) -> Vec<&str> {
    tags.iter().map(|t| t.name.as_str()).collect()
}

#[tokio::test]
async fn test_save_item_links_tags() {
    let state = state().await;

    let item = create_item(&state, "groceries".to_string(), Some("food, errand".to_string()))
        .await
        .unwrap();
    assert!(item.id > 0);
    assert_eq!(item.tag_text, "food,errand");

    let tags = get_item_tags(&state, item.id).await.unwrap();
    assert_eq!(names(&tags), vec!["food", "errand"]);
}

#[tokio::test]
async fn test_save_existing_item_replaces_tags() {
    let state = state().await;
    let mut item = create_item(&state, "a".to_string(), Some("red,green".to_string()))
        .await
        .unwrap();

    item.text = "b".to_string();
    item.tag_text = "green, blue".to_string();
    let saved = save_item(&state, item).await.unwrap();
    assert_eq!(saved.text, "b");
    assert_eq!(saved.tag_text, "green,blue");

    let all = list_tags(&state).await.unwrap();
    let red = all.iter().find(|t| t.name == "red").unwrap();
    assert_eq!(tag_usage(&state, red.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_save_unknown_item_fails() {
    let state = state().await;
    let err = save_item(&state, Item::with_tags(42, "x".to_string(), "t".to_string()))
        .await
        .unwrap_err();
    assert!(err.contains("42"));
    assert!(list_tags(&state).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_and_list_fill_tag_text() {
    let state = state().await;
    let first = create_item(&state, "one".to_string(), Some("x".to_string())).await.unwrap();
    create_item(&state, "two".to_string(), None).await.unwrap();

    let loaded = load_item(&state, first.id).await.unwrap().unwrap();
    assert_eq!(loaded.tag_text, "x");
    assert!(load_item(&state, 999).await.unwrap().is_none());

    let texts: Vec<String> = list_items(&state)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.tag_text)
        .collect();
    assert_eq!(texts, vec!["x".to_string(), String::new()]);
}

#[tokio::test]
async fn test_set_item_tags_reports_changes() {
    let state = state().await;
    let item = create_item(&state, "a".to_string(), Some("one,two".to_string())).await.unwrap();

    let report = set_item_tags(&state, item.id, "two,three".to_string()).await.unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.added, 1);
    assert_eq!(report.removed, 1);

    let again = set_item_tags(&state, item.id, "two,three".to_string()).await.unwrap();
    assert!(again.is_noop());

    assert!(set_item_tags(&state, 999, "x".to_string()).await.is_err());
}

#[tokio::test]
async fn test_delete_item_releases_counts() {
    let state = state().await;
    let a = create_item(&state, "a".to_string(), Some("shared".to_string())).await.unwrap();
    create_item(&state, "b".to_string(), Some("shared".to_string())).await.unwrap();

    let shared = list_tags(&state).await.unwrap().remove(0);
    assert_eq!(tag_usage(&state, shared.id).await.unwrap(), 2);

    delete_item(&state, a.id).await.unwrap();
    assert_eq!(tag_usage(&state, shared.id).await.unwrap(), 1);
    assert!(load_item(&state, a.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_tag_unlinks_items() {
    let state = state().await;
    let item = create_item(&state, "a".to_string(), Some("keep,drop".to_string()))
        .await
        .unwrap();
    let drop = list_tags(&state)
        .await
        .unwrap()
        .into_iter()
        .find(|t| t.name == "drop")
        .unwrap();

    delete_tag(&state, drop.id).await.unwrap();
    assert!(get_tag(&state, drop.id).await.unwrap().is_none());
    assert!(get_items_by_tag(&state, drop.id, None).await.unwrap().is_empty());

    let loaded = load_item(&state, item.id).await.unwrap().unwrap();
    assert_eq!(loaded.tag_text, "keep");
}

#[tokio::test]
async fn test_get_items_by_tag_with_filter() {
    let state = state().await;
    create_item(&state, "buy milk".to_string(), Some("todo".to_string())).await.unwrap();
    create_item(&state, "call bob".to_string(), Some("todo".to_string())).await.unwrap();
    let todo = list_tags(&state).await.unwrap().remove(0);

    assert_eq!(get_items_by_tag(&state, todo.id, None).await.unwrap().len(), 2);
    let milk = get_items_by_tag(&state, todo.id, Some("milk".to_string())).await.unwrap();
    assert_eq!(milk.len(), 1);
    assert_eq!(milk[0].text, "buy milk");
}

#[tokio::test]
async fn test_suggest_tags_returns_json() {
    let state = state().await;
    create_item(&state, "a".to_string(), Some("rust,ruby,go".to_string())).await.unwrap();

    assert_eq!(suggest_tags(&state, "ru").await.unwrap(), r#"["ruby","rust"]"#);
    assert_eq!(suggest_tags(&state, "zz").await.unwrap(), "[]");
}

#[tokio::test]
async fn test_tag_links_for_item() {
    let state = state().await;
    let item = create_item(&state, "a".to_string(), Some("x,y".to_string())).await.unwrap();
    let tags = get_item_tags(&state, item.id).await.unwrap();

    let html = tag_links_for_item(&state, item.id).await.unwrap();
    assert_eq!(
        html,
        format!(
            r#"<a href="/tag/view?id={}">x</a>, <a href="/tag/view?id={}">y</a>"#,
            tags[0].id, tags[1].id
        )
    );
}

#[tokio::test]
async fn test_rename_and_move() {
    let state = state().await;
    let item = create_item(&state, "a".to_string(), Some("a,b,c".to_string())).await.unwrap();
    let tags = get_item_tags(&state, item.id).await.unwrap();

    move_item_tag(&state, item.id, tags[2].id, 0).await.unwrap();
    let moved = get_item_tags(&state, item.id).await.unwrap();
    assert_eq!(names(&moved), vec!["c", "a", "b"]);

    let renamed = rename_tag(&state, tags[0].id, " alpha ".to_string()).await.unwrap();
    assert_eq!(renamed.name, "alpha");
    assert!(rename_tag(&state, tags[0].id, "b".to_string()).await.is_err());
    assert!(rename_tag(&state, tags[0].id, "  ".to_string()).await.is_err());

    assert_eq!(reindex_tags(&state).await.unwrap(), 0);
    assert_eq!(recount_tags(&state).await.unwrap(), 3);
}
