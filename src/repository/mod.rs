//! Repository Layer
//!
//! Data access abstractions and their SQLite implementations.

mod traits;
mod db;
mod sql;
mod item_repo;
pub mod tag;


pub use traits::{NamedRepository, Repository, SearchableRepository};
pub use db::{init_db, run_migrations, DbState};
pub use item_repo::ItemRepository;
pub use tag::TagRepository;
