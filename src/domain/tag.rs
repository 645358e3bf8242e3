//! Tag Entity
//!
//! Tags are attached to owner records through the junction table.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// A tag attached to owner records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag name, unique by convention
    pub name: String,
    /// Number of owners using this tag; `None` when counters are disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

impl Tag {
    pub fn new(id: i64, name: String) -> Self {
        Self {
            id,
            name,
            count: None,
        }
    }
}

impl Entity for Tag {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Junction table entry for the owner-tag relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerTag {
    pub owner_id: i64,
    pub tag_id: i64,
    /// Zero-based display position within the owner's tags
    pub position: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_creation() {
        let tag = Tag::new(1, "Work".to_string());
        assert_eq!(tag.id(), 1);
        assert_eq!(tag.name, "Work");
        assert!(tag.count.is_none());
    }

    #[test]
    fn test_count_omitted_from_json_when_disabled() {
        let json = serde_json::to_string(&Tag::new(7, "rust".to_string())).unwrap();
        assert_eq!(json, r#"{"id":7,"name":"rust"}"#);
    }
}
