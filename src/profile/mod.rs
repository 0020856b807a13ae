//! # Profile Module
//!
//! Performance and scene profiles: their typed shapes, the schemas they are
//! checked against and the loader that fetches them.

mod loader;
mod schema;
pub(crate) mod schemas;
mod types;

pub use loader::*;
pub use schema::*;
pub use schemas::*;
pub use types::*;
