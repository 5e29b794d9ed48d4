//! Domain Layer
//!
//! Groups, shortcuts, todos and users as plain serde types, plus the patch
//! types the API applies to them.

mod entity;
mod group;
mod shortcut;
mod todo;
mod user;

pub use entity::{require_text, DomainError, DomainResult, Entity};
pub use group::{Group, GroupPatch};
pub use shortcut::{Shortcut, ShortcutOrder, ShortcutPatch, ShortcutPosition};
pub use todo::{Todo, TodoPatch};
pub use user::User;
