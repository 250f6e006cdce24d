//! Vector index store domain

mod entity;
mod store;

pub use entity::{IndexEntry, ScoredEntry, SourceIndex};
pub use store::VectorIndexStore;

#[cfg(test)]
pub use store::MockVectorIndexStore;
