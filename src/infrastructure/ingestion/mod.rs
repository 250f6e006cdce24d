//! Ingestion infrastructure implementations

mod fixed_size;

pub use fixed_size::FixedSizeChunker;
