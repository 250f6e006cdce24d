//! API request and response types

pub mod build;
pub mod error;
pub mod json;
pub mod search;
pub mod source;

pub use build::{
    BuildAcceptedResponse, BuildDefaults, CreateIndexApiRequest, CreationProgressResponse,
    IndicesResponse, JobResponse, ListJobsResponse, SourceBuildApiRequest,
};
pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use search::{SearchApiRequest, SearchApiResponse, SearchResultItem};
pub use source::{
    AddDocumentsApiRequest, AddDocumentsResponse, EditSourceApiRequest, ListSourcesParams,
    ListSourcesResponse, RegisterSourceApiRequest, SourceResponse,
};
