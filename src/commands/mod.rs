//! Commands Layer
//!
//! Handlers that bridge the CLI (or any other caller) to the repositories.
//! Errors are flattened to strings at this boundary.

mod item_cmd;
mod tag_cmd;

pub use item_cmd::*;
pub use tag_cmd::*;

#[cfg(test)]
mod tests;
