//! Repository Layer - Core Traits
//!
//! Abstract data-access interfaces shared by the owner and tag repositories.

use async_trait::async_trait;
use crate::domain::{Entity, DomainResult};

/// CRUD over one entity type.
///
/// Async so callers can share one connection behind a `tokio` mutex.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert and return the entity with its assigned ID
    async fn create(&self, entity: &T) -> DomainResult<T>;

    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    async fn list(&self) -> DomainResult<Vec<T>>;

    async fn update(&self, entity: &T) -> DomainResult<T>;

    /// Delete by ID; deleting a missing row is not an error
    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}

/// Entities addressed by a unique name
#[async_trait]
pub trait NamedRepository<T: Entity>: Repository<T> {
    /// Exact-match lookup
    async fn find_by_name(&self, name: &str) -> DomainResult<Option<T>>;

    /// Look up by name, inserting a new row when none exists
    async fn find_or_create(&self, name: &str) -> DomainResult<T>;
}

/// Text search (autocomplete)
#[async_trait]
pub trait SearchableRepository<T: Entity>: Repository<T> {
    /// Entities whose name matches the configured search pattern for `term`
    async fn search(&self, term: &str) -> DomainResult<Vec<T>>;
}
