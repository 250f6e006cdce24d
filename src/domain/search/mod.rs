//! Federated search domain

mod adapter;
mod highlight;
mod hit;
mod query;

pub use adapter::{AdapterDescription, SourceAdapter};
pub use highlight::{TextSpan, find_spans};
pub use hit::{
    DegradedReason, DegradedSource, Highlights, SearchHit, SearchResponse, clamp_score,
};
pub use query::{MAX_QUERY_CHARS, SearchQuery};

#[cfg(test)]
pub use adapter::MockSourceAdapter;
