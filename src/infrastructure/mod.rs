//! Infrastructure layer - In-process implementations of the domain collaborators

pub mod adapters;
pub mod corpus;
pub mod embedding;
pub mod index_build;
pub mod index_store;
pub mod ingestion;
pub mod observability;
pub mod services;
pub mod source;
