//! SQL Statements
//!
//! Table and column names come from [`TaggableConfig`], so statements are
//! built once per repository instead of being string literals. Identifiers
//! are validated by the config and quoted here.

use crate::config::TaggableConfig;

/// Quote a validated identifier
pub(crate) fn quote(ident: &str) -> String {
    format!("\"{}\"", ident)
}

/// Prepared statement text for one configuration
#[derive(Debug, Clone)]
pub(crate) struct Sql {
    // tags
    pub find_tag_by_id: String,
    pub find_tag_by_name: String,
    pub list_tags: String,
    pub insert_tag: String,
    pub update_tag_name: String,
    pub delete_tag: String,
    pub search_tags: String,
    pub tag_exists: String,

    // counters
    pub adjust_count: String,
    pub decrement_counts_for_owner: String,
    pub read_count: String,
    pub recount_all: String,

    // junction
    pub tags_for_owner: String,
    pub insert_link: String,
    pub delete_link: String,
    pub delete_links_for_owner: String,
    pub delete_links_for_tag: String,
    pub delete_shared_links_for_tag: Vec<String>,
    pub update_position: String,
    pub owners_with_tag: String,
    pub count_links_for_tag: String,
    pub links_for_owner: String,
    pub linked_owners: String,

    // owners
    pub find_item: String,
    pub list_items: String,
    pub insert_item: String,
    pub update_item: String,
    pub delete_item: String,
    pub items_with_tag: String,
}

impl Sql {
    pub fn new(config: &TaggableConfig) -> Self {
        let t = quote(&config.tag.table);
        let t_key = quote(&config.tag.key_column);
        let t_name = quote(&config.tag.name_column);

        let j = quote(&config.junction.table);
        let j_tag = quote(&config.junction.tag_key_column);
        let j_owner = quote(&config.junction.owner_key_column);

        let o = quote(&config.owner.table);
        let o_key = quote(&config.owner.key_column);

        // Without a counter column the third selected value is NULL
        let t_count_select = match &config.tag.count_column {
            Some(c) => format!("t.{}", quote(c)),
            None => "NULL".to_string(),
        };
        let tag_columns = format!("t.{}, t.{}, {}", t_key, t_name, t_count_select);

        let (position_select, owner_order) = match &config.junction.order_column {
            Some(ord) => {
                let ord = quote(ord);
                (format!("j.{}", ord), format!("j.{}, t.{}", ord, t_key))
            }
            None => ("NULL".to_string(), format!("t.{}", t_key)),
        };

        let insert_link = match &config.junction.order_column {
            Some(ord) => format!(
                "INSERT INTO {} ({}, {}, {}) VALUES (?1, ?2, ?3)",
                j,
                j_owner,
                j_tag,
                quote(ord)
            ),
            None => format!("INSERT INTO {} ({}, {}) VALUES (?1, ?2)", j, j_owner, j_tag),
        };

        let update_position = match &config.junction.order_column {
            Some(ord) => format!(
                "UPDATE {} SET {} = ?3 WHERE {} = ?1 AND {} = ?2",
                j,
                quote(ord),
                j_owner,
                j_tag
            ),
            None => String::new(),
        };

        let (adjust_count, decrement_counts_for_owner, read_count, recount_all) = match &config.tag.count_column {
            Some(c) => {
                let c = quote(c);
                (
                    format!("UPDATE {} SET {} = {} + ?2 WHERE {} = ?1", t, c, c, t_key),
                    format!(
                        "UPDATE {} SET {} = {} - 1 WHERE {} IN (SELECT {} FROM {} WHERE {} = ?1)",
                        t, c, c, t_key, j_tag, j, j_owner
                    ),
                    format!("SELECT {} FROM {} WHERE {} = ?1", c, t, t_key),
                    format!(
                        "UPDATE {} SET {} = (SELECT COUNT(*) FROM {} WHERE {}.{} = {}.{})",
                        t, c, j, j, j_tag, t, t_key
                    ),
                )
            }
            None => (String::new(), String::new(), String::new(), String::new()),
        };

        Self {
            find_tag_by_id: format!("SELECT {} FROM {} t WHERE t.{} = ?1", tag_columns, t, t_key),
            find_tag_by_name: format!(
                "SELECT {} FROM {} t WHERE t.{} = ?1",
                tag_columns, t, t_name
            ),
            list_tags: format!("SELECT {} FROM {} t ORDER BY t.{}", tag_columns, t, t_name),
            insert_tag: format!("INSERT INTO {} ({}) VALUES (?1)", t, t_name),
            update_tag_name: format!("UPDATE {} SET {} = ?2 WHERE {} = ?1", t, t_name, t_key),
            delete_tag: format!("DELETE FROM {} WHERE {} = ?1", t, t_key),
            search_tags: format!(
                "SELECT {} FROM {} t WHERE t.{} LIKE ?1 ESCAPE '\\' ORDER BY t.{}",
                tag_columns, t, t_name, t_name
            ),
            tag_exists: format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)", t, t_key),

            adjust_count,
            decrement_counts_for_owner,
            read_count,
            recount_all,

            tags_for_owner: format!(
                "SELECT {}, {} FROM {} t JOIN {} j ON t.{} = j.{} WHERE j.{} = ?1 ORDER BY {}",
                tag_columns, position_select, t, j, t_key, j_tag, j_owner, owner_order
            ),
            insert_link,
            delete_link: format!("DELETE FROM {} WHERE {} = ?1 AND {} = ?2", j, j_owner, j_tag),
            delete_links_for_owner: format!("DELETE FROM {} WHERE {} = ?1", j, j_owner),
            delete_links_for_tag: format!("DELETE FROM {} WHERE {} = ?1", j, j_tag),
            delete_shared_links_for_tag: config
                .tag
                .shared_junctions
                .iter()
                .map(|shared| {
                    format!(
                        "DELETE FROM {} WHERE {} = ?1",
                        quote(&shared.table),
                        quote(&shared.tag_key_column)
                    )
                })
                .collect(),
            update_position,
            owners_with_tag: format!("SELECT {} FROM {} WHERE {} = ?1", j_owner, j, j_tag),
            count_links_for_tag: format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", j, j_tag),
            links_for_owner: format!(
                "SELECT {}, {}, {} FROM {} j WHERE {} = ?1",
                j_owner, j_tag, position_select, j, j_owner
            ),
            linked_owners: format!("SELECT DISTINCT {} FROM {} ORDER BY {}", j_owner, j, j_owner),

            find_item: format!("SELECT {}, text FROM {} WHERE {} = ?1", o_key, o, o_key),
            list_items: format!("SELECT {}, text FROM {} ORDER BY {}", o_key, o, o_key),
            insert_item: format!("INSERT INTO {} (text) VALUES (?1)", o),
            update_item: format!("UPDATE {} SET text = ?2 WHERE {} = ?1", o, o_key),
            delete_item: format!("DELETE FROM {} WHERE {} = ?1", o, o_key),
            items_with_tag: format!(
                "SELECT o.{}, o.text FROM {} o JOIN {} j ON o.{} = j.{} WHERE j.{} = ?1",
                o_key, o, j, o_key, j_owner, j_tag
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_for_owner_orders_by_position() {
        let sql = Sql::new(&TaggableConfig::new("item_tags"));
        assert_eq!(
            sql.tags_for_owner,
            "SELECT t.\"id\", t.\"name\", t.\"count\", j.\"ord\" FROM \"tags\" t \
             JOIN \"item_tags\" j ON t.\"id\" = j.\"tag_id\" \
             WHERE j.\"model_id\" = ?1 ORDER BY j.\"ord\", t.\"id\""
        );
    }

    #[test]
    fn test_disabled_columns_select_null() {
        let sql = Sql::new(&TaggableConfig::new("item_tags").without_counter().without_order());
        assert!(sql.find_tag_by_id.contains("NULL"));
        assert!(sql.tags_for_owner.ends_with("ORDER BY t.\"id\""));
        assert!(sql.adjust_count.is_empty());
        assert!(sql.update_position.is_empty());
        assert_eq!(
            sql.insert_link,
            "INSERT INTO \"item_tags\" (\"model_id\", \"tag_id\") VALUES (?1, ?2)"
        );
    }
}
