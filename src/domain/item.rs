//! Item Entity
//!
//! The owner record of this crate: a text item that can carry tags.

use serde::{Deserialize, Serialize};
use super::entity::{DomainResult, Entity};

/// Records that carry tags through the junction table.
///
/// `tag_text` is transient: it is filled from the stored tags on read and
/// consumed by reconciliation on write.
pub trait Taggable {
    /// Primary key of the committed record
    fn owner_key(&self) -> i64;

    /// Delimiter-separated tag names
    fn tag_text(&self) -> &str;

    fn set_tag_text(&mut self, text: String);
}

/// Validation hook for the transient tag field.
///
/// Any string is accepted; tag-name rules belong to the Tag record itself.
pub fn validate_tag_text(_text: &str) -> DomainResult<()> {
    Ok(())
}

/// A text item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (0 until inserted)
    pub id: i64,
    /// Item text content
    pub text: String,
    /// Transient tag names, not stored in the items table
    #[serde(default)]
    pub tag_text: String,
}

impl Item {
    pub fn new(id: i64, text: String) -> Self {
        Self {
            id,
            text,
            tag_text: String::new(),
        }
    }

    pub fn with_tags(id: i64, text: String, tag_text: String) -> Self {
        Self { id, text, tag_text }
    }
}

impl Entity for Item {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Taggable for Item {
    fn owner_key(&self) -> i64 {
        self.id
    }

    fn tag_text(&self) -> &str {
        &self.tag_text
    }

    fn set_tag_text(&mut self, text: String) {
        self.tag_text = text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_creation() {
        let item = Item::new(1, "Buy milk".to_string());
        assert_eq!(item.id(), 1);
        assert_eq!(item.owner_key(), 1);
        assert_eq!(item.tag_text(), "");
    }

    #[test]
    fn test_tag_text_roundtrip() {
        let mut item = Item::new(0, "Draft".to_string());
        item.set_tag_text("a,b".to_string());
        assert_eq!(item.tag_text(), "a,b");
    }

    #[test]
    fn test_tag_text_always_valid() {
        assert!(validate_tag_text("").is_ok());
        assert!(validate_tag_text(",,, ;weird<>\u{1F600}").is_ok());
    }
}
