//! Shortcut Entity
//!
//! A bookmark tile: title, icon and two addresses (LAN and public), placed
//! inside a group at `order_num`.

use serde::{Deserialize, Deserializer, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortcut {
    pub id: i64,
    pub group_id: i64,
    /// Position within the group; unique only per group
    pub order_num: i64,
    pub title: String,
    pub icon: Option<String>,
    pub internal_network: Option<String>,
    pub private_network: Option<String>,
    /// Joined from `groups.name` on reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

impl Shortcut {
    pub fn new(id: i64, group_id: i64, order_num: i64, title: String) -> Self {
        Self {
            id,
            group_id,
            order_num,
            title,
            icon: None,
            internal_network: None,
            private_network: None,
            group_name: None,
        }
    }
}

impl Entity for Shortcut {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Partial update for a shortcut; `None` keeps the stored value.
///
/// The nullable columns take `Some(None)` (a JSON `null`) to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutPatch {
    pub group_id: Option<i64>,
    pub order_num: Option<i64>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub internal_network: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub private_network: Option<Option<String>>,
}

/// Any key that is present, `null` included, becomes `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ShortcutPatch {
    pub fn apply(self, existing: Shortcut) -> Shortcut {
        Shortcut {
            id: existing.id,
            group_id: self.group_id.unwrap_or(existing.group_id),
            order_num: self.order_num.unwrap_or(existing.order_num),
            title: self.title.unwrap_or(existing.title),
            icon: self.icon.unwrap_or(existing.icon),
            internal_network: self.internal_network.unwrap_or(existing.internal_network),
            private_network: self.private_network.unwrap_or(existing.private_network),
            group_name: None,
        }
    }
}

/// One entry of a batch reorder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutPosition {
    pub id: i64,
    pub group_id: i64,
    pub order_num: i64,
}

/// One entry of a reorder inside a single group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutOrder {
    pub id: i64,
    pub order_num: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_json_is_camel_case() {
        let mut shortcut = Shortcut::new(1, 2, 0, "NAS".to_string());
        shortcut.internal_network = Some("http://192.168.1.2:5000".to_string());
        let json = serde_json::to_value(&shortcut).unwrap();
        assert_eq!(json["groupId"], 2);
        assert_eq!(json["orderNum"], 0);
        assert_eq!(json["internalNetwork"], "http://192.168.1.2:5000");
        assert!(json.get("groupName").is_none());
    }

    #[test]
    fn test_patch_moves_between_groups() {
        let mut shortcut = Shortcut::new(5, 1, 3, "Router".to_string());
        shortcut.icon = Some("/logo/router.png".to_string());
        let patch = ShortcutPatch {
            group_id: Some(2),
            order_num: Some(0),
            ..Default::default()
        };
        let moved = patch.apply(shortcut);
        assert_eq!(moved.group_id, 2);
        assert_eq!(moved.order_num, 0);
        assert_eq!(moved.title, "Router");
        assert_eq!(moved.icon.as_deref(), Some("/logo/router.png"));
    }

    #[test]
    fn test_patch_null_clears_absent_keeps() {
        let mut shortcut = Shortcut::new(7, 1, 0, "Wiki".to_string());
        shortcut.icon = Some("/logo/wiki.png".to_string());
        shortcut.internal_network = Some("http://10.0.0.5".to_string());
        shortcut.private_network = Some("https://wiki.example.com".to_string());

        let patch: ShortcutPatch = serde_json::from_str(
            r#"{ "icon": null, "privateNetwork": "https://docs.example.com" }"#,
        )
        .unwrap();
        assert_eq!(patch.icon, Some(None));
        assert_eq!(patch.internal_network, None);

        let updated = patch.apply(shortcut);
        assert_eq!(updated.icon, None);
        assert_eq!(updated.internal_network.as_deref(), Some("http://10.0.0.5"));
        assert_eq!(updated.private_network.as_deref(), Some("https://docs.example.com"));
    }
}
