//! Tagging configuration.
//!
//! Names the tables and columns that link owners to tags. Loaded from JSON;
//! every field except the junction table has a default.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::domain::{DomainError, DomainResult};

/// Placeholder replaced by the search term in [`TaggableConfig::suggest_pattern`]
pub const TERM_PLACEHOLDER: &str = "{term}";

/// Owner (taggable) table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSchema {
    #[serde(default = "default_owner_table")]
    pub table: String,
    #[serde(default = "default_key_column")]
    pub key_column: String,
}

impl Default for OwnerSchema {
    fn default() -> Self {
        Self {
            table: default_owner_table(),
            key_column: default_key_column(),
        }
    }
}

/// Tag table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSchema {
    #[serde(default = "default_tag_table")]
    pub table: String,
    #[serde(default = "default_key_column")]
    pub key_column: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    /// Denormalized usage counter. `null` disables counting.
    #[serde(default = "default_count_column")]
    pub count_column: Option<String>,
    /// Route used when rendering tag links
    #[serde(default = "default_link_route")]
    pub link_route: String,
    /// Junction tables of other owner types linking to the same tags.
    /// Their links are removed together with the tag.
    #[serde(default)]
    pub shared_junctions: Vec<SharedJunction>,
}

/// A junction table owned by another taggable type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedJunction {
    pub table: String,
    #[serde(default = "default_tag_key_column")]
    pub tag_key_column: String,
}

impl SharedJunction {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            tag_key_column: default_tag_key_column(),
        }
    }
}

impl Default for TagSchema {
    fn default() -> Self {
        Self {
            table: default_tag_table(),
            key_column: default_key_column(),
            name_column: default_name_column(),
            count_column: default_count_column(),
            link_route: default_link_route(),
            shared_junctions: Vec::new(),
        }
    }
}

/// Junction table linking owners to tags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunctionSchema {
    /// Required. There is no default junction table.
    #[serde(default)]
    pub table: String,
    #[serde(default = "default_tag_key_column")]
    pub tag_key_column: String,
    #[serde(default = "default_owner_key_column")]
    pub owner_key_column: String,
    /// Display order column. `null` disables ordering.
    #[serde(default = "default_order_column")]
    pub order_column: Option<String>,
}

impl JunctionSchema {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            tag_key_column: default_tag_key_column(),
            owner_key_column: default_owner_key_column(),
            order_column: default_order_column(),
        }
    }
}

/// Full tagging configuration for one owner type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggableConfig {
    #[serde(default)]
    pub owner: OwnerSchema,
    #[serde(default)]
    pub tag: TagSchema,
    pub junction: JunctionSchema,
    /// Separator of the free-text tag list
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Text placed between rendered tag links
    #[serde(default = "default_link_glue")]
    pub link_glue: String,
    /// Extra attributes for rendered tag links
    #[serde(default)]
    pub link_options: BTreeMap<String, String>,
    /// `LIKE` pattern for suggestions; `{term}%` matches prefixes, `%{term}%` substrings
    #[serde(default = "default_suggest_pattern")]
    pub suggest_pattern: String,
}

fn default_owner_table() -> String {
    "items".to_string()
}

fn default_tag_table() -> String {
    "tags".to_string()
}

fn default_key_column() -> String {
    "id".to_string()
}

fn default_name_column() -> String {
    "name".to_string()
}

fn default_count_column() -> Option<String> {
    Some("count".to_string())
}

fn default_link_route() -> String {
    "tag/view".to_string()
}

fn default_tag_key_column() -> String {
    "tag_id".to_string()
}

fn default_owner_key_column() -> String {
    "model_id".to_string()
}

fn default_order_column() -> Option<String> {
    Some("ord".to_string())
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_link_glue() -> String {
    ", ".to_string()
}

fn default_suggest_pattern() -> String {
    format!("{}%", TERM_PLACEHOLDER)
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"))
}

fn check_identifier(field: &str, value: &str) -> DomainResult<()> {
    if value.is_empty() {
        return Err(DomainError::Config(format!("{} is not set", field)));
    }
    if !identifier_regex().is_match(value) {
        return Err(DomainError::Config(format!(
            "{} is not a valid identifier: {:?}",
            field, value
        )));
    }
    Ok(())
}

impl TaggableConfig {
    /// Defaults everywhere, linked through `junction_table`
    pub fn new(junction_table: impl Into<String>) -> Self {
        Self {
            owner: OwnerSchema::default(),
            tag: TagSchema::default(),
            junction: JunctionSchema::new(junction_table),
            delimiter: default_delimiter(),
            link_glue: default_link_glue(),
            link_options: BTreeMap::new(),
            suggest_pattern: default_suggest_pattern(),
        }
    }

    pub fn without_counter(mut self) -> Self {
        self.tag.count_column = None;
        self
    }

    pub fn without_order(mut self) -> Self {
        self.junction.order_column = None;
        self
    }

    /// Also clean up `table` when a tag is deleted
    pub fn with_shared_junction(mut self, table: impl Into<String>) -> Self {
        self.tag.shared_junctions.push(SharedJunction::new(table));
        self
    }

    pub fn counts_enabled(&self) -> bool {
        self.tag.count_column.is_some()
    }

    pub fn order_enabled(&self) -> bool {
        self.junction.order_column.is_some()
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DomainError::Config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Fail fast on missing or malformed linkage settings
    pub fn validate(&self) -> DomainResult<()> {
        check_identifier("junction.table", &self.junction.table)?;
        check_identifier("junction.tag_key_column", &self.junction.tag_key_column)?;
        check_identifier("junction.owner_key_column", &self.junction.owner_key_column)?;
        if let Some(order) = &self.junction.order_column {
            check_identifier("junction.order_column", order)?;
        }

        check_identifier("tag.table", &self.tag.table)?;
        check_identifier("tag.key_column", &self.tag.key_column)?;
        check_identifier("tag.name_column", &self.tag.name_column)?;
        if let Some(count) = &self.tag.count_column {
            check_identifier("tag.count_column", count)?;
        }

        for shared in &self.tag.shared_junctions {
            check_identifier("tag.shared_junctions.table", &shared.table)?;
            check_identifier("tag.shared_junctions.tag_key_column", &shared.tag_key_column)?;
            if shared.table == self.junction.table || shared.table == self.tag.table {
                return Err(DomainError::Config(format!(
                    "shared junction {} must differ from the junction and tag tables",
                    shared.table
                )));
            }
        }

        check_identifier("owner.table", &self.owner.table)?;
        check_identifier("owner.key_column", &self.owner.key_column)?;

        if self.junction.table == self.tag.table || self.junction.table == self.owner.table {
            return Err(DomainError::Config(
                "junction.table must differ from the tag and owner tables".to_string(),
            ));
        }
        if self.delimiter.is_empty() {
            return Err(DomainError::Config("delimiter is empty".to_string()));
        }
        if !self.suggest_pattern.contains(TERM_PLACEHOLDER) {
            return Err(DomainError::Config(format!(
                "suggest_pattern must contain {}",
                TERM_PLACEHOLDER
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TaggableConfig::new("item_tags");
        assert!(config.validate().is_ok());
        assert_eq!(config.tag.name_column, "name");
        assert_eq!(config.junction.owner_key_column, "model_id");
        assert!(config.counts_enabled());
        assert!(config.order_enabled());
        assert_eq!(config.suggest_pattern, "{term}%");
    }

    #[test]
    fn test_missing_junction_table_fails() {
        let err = TaggableConfig::new("").validate().unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));

        let err = TaggableConfig::from_json("{}").unwrap_err();
        assert!(err.to_string().contains("junction"));
    }

    #[test]
    fn test_invalid_identifier_fails() {
        let mut config = TaggableConfig::new("item_tags");
        config.tag.name_column = "name; DROP TABLE tags".to_string();
        assert!(matches!(config.validate(), Err(DomainError::Config(_))));
    }

    #[test]
    fn test_json_nulls_disable_optional_columns() {
        let config = TaggableConfig::from_json(
            r#"{
                "junction": { "table": "post_tags", "order_column": null },
                "tag": { "count_column": null },
                "suggest_pattern": "%{term}%"
            }"#,
        )
        .unwrap();
        assert!(!config.counts_enabled());
        assert!(!config.order_enabled());
        assert_eq!(config.junction.tag_key_column, "tag_id");
        assert_eq!(config.owner.table, "items");
    }

    #[test]
    fn test_shared_junctions() {
        let config = TaggableConfig::from_json(
            r#"{
                "junction": { "table": "item_tags" },
                "tag": { "shared_junctions": [
                    { "table": "note_tags" },
                    { "table": "post_labels", "tag_key_column": "label_id" }
                ] }
            }"#,
        )
        .unwrap();
        assert_eq!(config.tag.shared_junctions[0].tag_key_column, "tag_id");
        assert_eq!(config.tag.shared_junctions[1].tag_key_column, "label_id");

        let same = TaggableConfig::new("item_tags").with_shared_junction("item_tags");
        assert!(matches!(same.validate(), Err(DomainError::Config(_))));
        let bad = TaggableConfig::new("item_tags").with_shared_junction("note tags");
        assert!(matches!(bad.validate(), Err(DomainError::Config(_))));
    }

    #[test]
    fn test_pattern_without_placeholder_fails() {
        let mut config = TaggableConfig::new("item_tags");
        config.suggest_pattern = "%".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_delimiter_fails() {
        let mut config = TaggableConfig::new("item_tags");
        config.delimiter.clear();
        assert!(config.validate().is_err());
    }
}
