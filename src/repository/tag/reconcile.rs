//! Tag-Set Reconciliation
//!
//! Makes an owner's junction rows match a desired, ordered list of tag names.
//! Names are first resolved to tag keys (creating missing tags), then the key
//! sequence is diffed against the stored links: obsolete links are deleted,
//! new links inserted at their final position, kept links re-positioned where
//! needed, and usage counters adjusted. Everything for one owner runs in one
//! write transaction.

use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::{HashMap, HashSet};

use crate::config::TaggableConfig;
use crate::domain::{DomainResult, TagList};
use super::super::db::begin_write;
use super::super::sql::Sql;
use super::owner_tag::{linked_tags_in, LinkedTag};
use super::tag_counter::adjust_count_in;
use super::tag_repo::resolve_in;

/// Junction changes needed to reach a desired sequence of tag keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Tag keys to link, with their target position
    pub add: Vec<(i64, i64)>,
    /// Tag keys to unlink
    pub remove: Vec<i64>,
    /// Kept tag keys whose position changes: `(tag_id, new_position)`
    pub reorder: Vec<(i64, i64)>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.reorder.is_empty()
    }
}

/// Writes performed by one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Tag rows created
    pub created: usize,
    /// Links inserted
    pub added: usize,
    /// Links deleted
    pub removed: usize,
    /// Links whose position was rewritten
    pub reordered: usize,
}

impl ReconcileReport {
    pub fn writes(&self) -> usize {
        self.created + self.added + self.removed + self.reordered
    }

    pub fn is_noop(&self) -> bool {
        self.writes() == 0
    }
}

/// Diff the owner's current links against the desired tag keys.
///
/// A repeated key keeps its first occurrence. Positions are indexes in the
/// de-duplicated sequence, so they are always `0..n-1`. With `track_order`
/// off no reordering is planned.
pub fn plan_reconcile(current: &[LinkedTag], desired: &[i64], track_order: bool) -> ReconcilePlan {
    let current_positions: HashMap<i64, Option<i64>> = current
        .iter()
        .map(|linked| (linked.tag.id, linked.position))
        .collect();

    let mut plan = ReconcilePlan::default();
    let mut seen: HashSet<i64> = HashSet::new();

    for &tag_id in desired {
        if !seen.insert(tag_id) {
            continue;
        }
        let position = seen.len() as i64 - 1;
        match current_positions.get(&tag_id) {
            Some(current_position) => {
                if track_order && *current_position != Some(position) {
                    plan.reorder.push((tag_id, position));
                }
            }
            None => plan.add.push((tag_id, position)),
        }
    }

    plan.remove = current
        .iter()
        .filter(|linked| !seen.contains(&linked.tag.id))
        .map(|linked| linked.tag.id)
        .collect();

    plan
}

/// Map desired names to tag keys, creating missing tags.
///
/// Names already linked under the same spelling are taken from `current`;
/// the rest go through the store, whose collation decides which names are
/// equal. Returns the keys in list order and the number of tags created.
fn resolve_keys_in(
    conn: &Connection,
    sql: &Sql,
    current: &[LinkedTag],
    desired: &TagList,
) -> DomainResult<(Vec<i64>, usize)> {
    let linked: HashMap<&str, i64> = current
        .iter()
        .map(|linked| (linked.tag.name.as_str(), linked.tag.id))
        .collect();

    let mut keys = Vec::with_capacity(desired.len());
    let mut created = 0;
    for name in desired.names() {
        if let Some(tag_id) = linked.get(name.as_str()) {
            keys.push(*tag_id);
            continue;
        }
        let (tag, was_created) = resolve_in(conn, sql, name)?;
        if was_created {
            created += 1;
        }
        keys.push(tag.id);
    }
    Ok((keys, created))
}

/// Apply a reconciliation for `owner_id` inside one write transaction
pub(super) fn reconcile_in(
    conn: &mut Connection,
    sql: &Sql,
    config: &TaggableConfig,
    owner_id: i64,
    desired: &TagList,
) -> DomainResult<ReconcileReport> {
    let tx = begin_write(conn)?;

    let current = linked_tags_in(&tx, sql, owner_id)?;
    let (keys, created) = resolve_keys_in(&tx, sql, &current, desired)?;
    let plan = plan_reconcile(&current, &keys, config.order_enabled());
    if plan.is_empty() && created == 0 {
        return Ok(ReconcileReport::default());
    }
    log::debug!(
        "Reconcile owner {}: +{} -{} ~{}",
        owner_id,
        plan.add.len(),
        plan.remove.len(),
        plan.reorder.len()
    );

    let mut report = ReconcileReport {
        created,
        ..Default::default()
    };

    for tag_id in &plan.remove {
        report.removed += tx.execute(&sql.delete_link, params![owner_id, tag_id])?;
        adjust_count_in(&tx, sql, config, *tag_id, -1)?;
    }

    for (tag_id, position) in &plan.add {
        if config.order_enabled() {
            tx.execute(&sql.insert_link, params![owner_id, tag_id, position])?;
        } else {
            tx.execute(&sql.insert_link, params![owner_id, tag_id])?;
        }
        adjust_count_in(&tx, sql, config, *tag_id, 1)?;
        report.added += 1;
    }

    for (tag_id, position) in &plan.reorder {
        report.reordered += tx.execute(&sql.update_position, params![owner_id, tag_id, position])?;
    }

    tx.commit()?;
    Ok(report)
}

/// Trait for tag-set synchronization
#[async_trait]
pub trait ReconcileOperations {
    /// Make the owner's links match `desired`, in order
    async fn reconcile(&self, owner_id: i64, desired: &TagList) -> DomainResult<ReconcileReport>;

    /// Same as [`reconcile`](Self::reconcile), parsing delimiter-separated text
    async fn reconcile_text(&self, owner_id: i64, tag_text: &str) -> DomainResult<ReconcileReport>;
}

#[async_trait]
impl ReconcileOperations for super::tag_repo::TagRepository {
    async fn reconcile(&self, owner_id: i64, desired: &TagList) -> DomainResult<ReconcileReport> {
        let mut conn = self.conn.lock().await;
        reconcile_in(&mut conn, &self.sql, &self.config, owner_id, desired)
    }

    async fn reconcile_text(&self, owner_id: i64, tag_text: &str) -> DomainResult<ReconcileReport> {
        let desired = TagList::parse(tag_text, &self.config.delimiter);
        self.reconcile(owner_id, &desired).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Tag;

    fn linked(id: i64, name: &str, position: i64) -> LinkedTag {
        LinkedTag {
            tag: Tag::new(id, name.to_string()),
            position: Some(position),
        }
    }

    #[test]
    fn test_plan_from_empty() {
        let plan = plan_reconcile(&[], &[7, 8], true);
        assert_eq!(plan.add, vec![(7, 0), (8, 1)]);
        assert!(plan.remove.is_empty());
        assert!(plan.reorder.is_empty());
    }

    #[test]
    fn test_plan_swap_red_for_blue() {
        let current = [linked(1, "red", 0), linked(2, "green", 1)];
        let plan = plan_reconcile(&current, &[2, 3], true);

        assert_eq!(plan.add, vec![(3, 1)]);
        assert_eq!(plan.remove, vec![1]);
        assert_eq!(plan.reorder, vec![(2, 0)]);
    }

    #[test]
    fn test_plan_identical_list_is_empty() {
        let current = [linked(1, "a", 0), linked(2, "b", 1)];
        assert!(plan_reconcile(&current, &[1, 2], true).is_empty());
    }

    #[test]
    fn test_plan_moves_only_shifted_tags() {
        let current = [linked(1, "a", 0), linked(2, "b", 1), linked(3, "c", 2)];
        let plan = plan_reconcile(&current, &[1, 3, 2], true);
        assert_eq!(plan.reorder, vec![(3, 1), (2, 2)]);
    }

    #[test]
    fn test_plan_repeated_key_leaves_no_gap() {
        // "Go" and "go" resolving to one tag under a case-insensitive column
        let plan = plan_reconcile(&[], &[5, 5, 9], true);
        assert_eq!(plan.add, vec![(5, 0), (9, 1)]);

        let current = [linked(5, "Go", 0), linked(9, "x", 1)];
        assert!(plan_reconcile(&current, &[5, 5, 9], true).is_empty());
    }

    #[test]
    fn test_plan_repairs_bad_positions() {
        // Duplicate positions left by an older schema
        let current = [linked(1, "a", 0), linked(2, "b", 0)];
        let plan = plan_reconcile(&current, &[1, 2], true);
        assert_eq!(plan.reorder, vec![(2, 1)]);
    }

    #[test]
    fn test_plan_without_order_tracking() {
        let current = [linked(1, "a", 0), linked(2, "b", 1)];
        let plan = plan_reconcile(&current, &[2, 1], false);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_empty_desired_removes_all() {
        let current = [linked(1, "a", 0), linked(2, "b", 1)];
        let plan = plan_reconcile(&current, &[], true);
        assert_eq!(plan.remove, vec![1, 2]);
        assert!(plan.add.is_empty());
    }

    #[test]
    fn test_report_noop() {
        assert!(ReconcileReport::default().is_noop());
        let report = ReconcileReport {
            reordered: 1,
            ..Default::default()
        };
        assert_eq!(report.writes(), 1);
    }
}
