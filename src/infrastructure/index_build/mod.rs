//! Index build infrastructure

mod in_memory_repository;
mod local_builder;

pub use in_memory_repository::InMemoryIndexJobRepository;
pub use local_builder::{EMBEDDING_BATCH_SIZE, LocalIndexBuilder};
