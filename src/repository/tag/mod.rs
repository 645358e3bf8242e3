//! Tag Repository Module
//!
//! This module provides tag repository functionality split into specialized sub-modules:
//! - tag_repo: Core CRUD operations and name lookup
//! - owner_tag: Owner-Tag relationship queries and cleanup
//! - reconcile: Tag-set synchronization
//! - tag_counter: Usage counters
//! - tag_positioning: Display order management
//! - tag_suggest: Autocomplete search

mod tag_repo;
mod owner_tag;
mod reconcile;
mod tag_counter;
mod tag_positioning;
mod tag_suggest;

pub use tag_repo::TagRepository;

// Re-export all operation traits so they can be used by importing TagRepository
pub use owner_tag::{LinkedTag, OwnerTagOperations};
pub use reconcile::{plan_reconcile, ReconcileOperations, ReconcilePlan, ReconcileReport};
pub use tag_counter::TagCounterOperations;
pub use tag_positioning::TagPositioningOperations;
pub use tag_suggest::{build_like_pattern, escape_like};
