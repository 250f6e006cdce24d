//! Embedding model implementations

mod hashing;

pub use hashing::{HashingEmbedder, HashingEmbedderLoader};
