//! Domain Layer
//!
//! Contains all domain entities and core abstractions.

mod entity;
mod item;
mod tag;
mod tag_list;

pub use entity::{Entity, DomainError, DomainResult};
pub use item::{Item, Taggable, validate_tag_text};
pub use tag::{Tag, OwnerTag};
pub use tag_list::TagList;
