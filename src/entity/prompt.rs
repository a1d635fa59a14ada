// src/entity/prompt.rs
use serde::{Deserialize, Serialize};

use super::{new_id, now_millis, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Empty when uncategorized. May dangle after a category is deleted elsewhere.
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    /// Content contains `{variable}` placeholders meant to be filled before use
    #[serde(default)]
    pub is_template: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Prompt {
    /// Create a prompt stamped with the current time for both timestamps.
    pub fn new(title: String, content: String) -> Self {
        Self::new_at(title, content, now_millis())
    }

    pub fn new_at(title: String, content: String, now: Timestamp) -> Self {
        Self {
            id: new_id(),
            title,
            content,
            category_id: String::new(),
            tags: Vec::new(),
            is_favorite: false,
            is_template: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at` after a mutation. Never moves it backwards.
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.max(now_millis());
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// User-editable prompt fields, used for both creation and full updates.
#[derive(Debug, Clone, Default)]
pub struct PromptDraft {
    pub title: String,
    pub content: String,
    pub category_id: String,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub is_template: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_prompt_timestamps_match() {
        let prompt = Prompt::new("Title".to_string(), "Body".to_string());
        assert_eq!(prompt.created_at, prompt.updated_at);
        assert!(prompt.category_id.is_empty());
    }

    #[test]
    fn test_touch_never_decreases() {
        let mut prompt = Prompt::new_at("T".to_string(), "C".to_string(), i64::MAX - 1);
        prompt.touch();
        assert_eq!(prompt.updated_at, i64::MAX - 1);

        let mut old = Prompt::new_at("T".to_string(), "C".to_string(), 0);
        old.touch();
        assert!(old.updated_at > 0);
        assert_eq!(old.created_at, 0);
    }

    #[test]
    fn test_deserialize_tolerates_missing_fields() {
        let json = r#"{
            "id": "101",
            "title": "React Component Generator",
            "content": "Create a component",
            "createdAt": 1700000000000,
            "updatedAt": 1700000000000
        }"#;
        let prompt: Prompt = serde_json::from_str(json).unwrap();
        assert_eq!(prompt.id, "101");
        assert!(prompt.tags.is_empty());
        assert!(!prompt.is_favorite);
        assert!(!prompt.is_template);
        assert!(prompt.category_id.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let prompt = Prompt::new_at("T".to_string(), "C".to_string(), 5);
        let value = serde_json::to_value(&prompt).unwrap();
        assert_eq!(value["createdAt"], 5);
        assert_eq!(value["isFavorite"], false);
        assert_eq!(value["categoryId"], "");
    }
}
