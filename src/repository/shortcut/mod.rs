//! Shortcut Repository Module
//!
//! - shortcut_repo: Core CRUD operations
//! - shortcut_positioning: Order management and batch reorder

mod shortcut_repo;
mod shortcut_positioning;

pub use shortcut_repo::ShortcutRepository;

// Re-export the operation trait so it can be used by importing ShortcutRepository
pub use shortcut_positioning::ShortcutPositioningOperations;
