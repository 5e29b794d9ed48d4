//! Group Entity
//!
//! An ordered category that owns shortcuts.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    /// Display order among groups (ascending)
    pub sort: i64,
}

impl Group {
    pub fn new(id: i64, name: String, sort: i64) -> Self {
        Self { id, name, sort }
    }
}

impl Entity for Group {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Partial update for a group; `None` keeps the stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub sort: Option<i64>,
}

impl GroupPatch {
    pub fn apply(self, existing: Group) -> Group {
        Group {
            id: existing.id,
            name: self.name.unwrap_or(existing.name),
            sort: self.sort.unwrap_or(existing.sort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_keeps_missing_fields() {
        let group = Group::new(3, "Servers".to_string(), 2);
        let patched = GroupPatch { name: None, sort: Some(7) }.apply(group);
        assert_eq!(patched.name, "Servers");
        assert_eq!(patched.sort, 7);
        assert_eq!(patched.id(), 3);
    }
}
