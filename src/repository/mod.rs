//! Repository Layer
//!
//! Data access abstractions and SQLite implementations.

mod traits;
mod db;
mod group_repo;
mod todo_repo;
mod user_repo;
pub mod shortcut;


pub use traits::Repository;
pub use db::{init_db, Db};
pub use group_repo::GroupRepository;
pub use shortcut::{ShortcutPositioningOperations, ShortcutRepository};
pub use todo_repo::TodoRepository;
pub use user_repo::UserRepository;
