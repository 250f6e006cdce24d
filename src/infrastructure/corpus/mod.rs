//! Raw corpus implementations

mod filesystem;
mod in_memory;

pub use filesystem::{FilesystemCorpus, PATH_CONFIG_KEY};
pub use in_memory::InMemoryCorpus;
