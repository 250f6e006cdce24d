//! Source registry storage implementations

mod in_memory_repository;

pub use in_memory_repository::InMemorySourceRepository;
