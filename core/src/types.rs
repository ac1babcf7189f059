//! Domain DTOs for the items API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! Ids are assigned by the server. A missing `description` in a response is
//! read as the empty string.

use serde::{Deserialize, Serialize};

/// Server-assigned item identifier.
pub type ItemId = i64;

/// A single task item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Item {
    /// Build an item from an id and a full set of fields.
    pub fn from_fields(id: ItemId, fields: ItemFields) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            completed: fields.completed,
        }
    }

    /// The editable part of this item, suitable for a full-replacement PUT.
    pub fn fields(&self) -> ItemFields {
        ItemFields {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
        }
    }
}

/// Request payload for creating a new item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl ItemDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            completed: false,
        }
    }

    /// True when the title is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }
}

/// Full-replacement payload for updating an existing item. Every field is
/// always sent; the server overwrites all three.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemFields {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Body some servers send back on a non-204 delete.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DeleteAck {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_missing_description_defaults_to_empty() {
        let item: Item = serde_json::from_str(r#"{"id":3,"title":"Walk dog","completed":true}"#).unwrap();
        assert_eq!(item.id, 3);
        assert_eq!(item.description, "");
        assert!(item.completed);
    }

    #[test]
    fn draft_is_blank_ignores_whitespace() {
        assert!(ItemDraft::new("   ", "d").is_blank());
        assert!(ItemDraft::new("", "").is_blank());
        assert!(!ItemDraft::new(" x ", "").is_blank());
    }

    #[test]
    fn fields_and_from_fields_preserve_values() {
        let item = Item {
            id: 9,
            title: "Read".to_string(),
            description: "chapter 4".to_string(),
            completed: false,
        };
        assert_eq!(Item::from_fields(9, item.fields()), item);
    }

    #[test]
    fn draft_serializes_all_fields() {
        let json = serde_json::to_value(ItemDraft::new("Buy milk", "2 litres")).unwrap();
        assert_eq!(json["title"], "Buy milk");
        assert_eq!(json["description"], "2 litres");
        assert_eq!(json["completed"], false);
        assert!(json.get("id").is_none());
    }
}
