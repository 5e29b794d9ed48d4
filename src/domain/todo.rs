//! Todo Entity

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub content: String,
    pub completed: bool,
    /// Unix millis
    pub create_time: i64,
    /// Unix millis
    pub update_time: i64,
}

impl Todo {
    pub fn new(id: i64, content: String) -> Self {
        Self {
            id,
            content,
            completed: false,
            create_time: 0,
            update_time: 0,
        }
    }
}

impl Entity for Todo {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Content-only, status-only, or both
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoPatch {
    pub content: Option<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.completed.is_none()
    }

    pub fn apply(self, existing: Todo) -> Todo {
        Todo {
            content: self.content.unwrap_or(existing.content),
            completed: self.completed.unwrap_or(existing.completed),
            ..existing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_patch_keeps_content() {
        let todo = Todo::new(1, "renew domain".to_string());
        let patched = TodoPatch { content: None, completed: Some(true) }.apply(todo);
        assert_eq!(patched.content, "renew domain");
        assert!(patched.completed);
    }

    #[test]
    fn test_empty_patch() {
        assert!(TodoPatch::default().is_empty());
        assert!(!TodoPatch { content: Some("x".into()), completed: None }.is_empty());
    }
}
