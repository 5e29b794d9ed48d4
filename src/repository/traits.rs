//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.

use async_trait::async_trait;
use crate::domain::{Entity, DomainResult};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type. Mutations report the number of rows the
/// statement actually touched, which the API passes back as `changes`.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Create a new entity, returning it with its assigned ID
    async fn create(&self, entity: &T) -> DomainResult<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// List all entities in display order
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Overwrite every column of an existing entity
    async fn update(&self, entity: &T) -> DomainResult<usize>;

    /// Delete entity by ID
    async fn delete(&self, id: T::Id) -> DomainResult<usize>;
}
