//! Data source request and response bodies

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::domain::corpus::RawDocument;
use crate::domain::source::{DataSource, SourceConfig, SourceStatus, SourceType};
use crate::infrastructure::services::{EditSourceRequest, RegisterSourceRequest, SourceFilter};

/// Body of `POST /sources`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterSourceApiRequest {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", alias = "source_type")]
    pub source_type: String,
    #[serde(default)]
    pub config: SourceConfig,
}

impl TryFrom<RegisterSourceApiRequest> for RegisterSourceRequest {
    type Error = ApiError;

    fn try_from(request: RegisterSourceApiRequest) -> Result<Self, Self::Error> {
        let source_type = SourceType::from_str(&request.source_type)
            .map_err(|e| ApiError::bad_request(e.to_string()).with_param("type"))?;

        Ok(Self {
            id: request.id,
            name: request.name,
            source_type,
            config: request.config,
        })
    }
}

/// Body of `PUT /sources/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct EditSourceApiRequest {
    pub expected_version: u64,
    pub name: Option<String>,
    pub config: Option<SourceConfig>,
}

impl From<EditSourceApiRequest> for EditSourceRequest {
    fn from(request: EditSourceApiRequest) -> Self {
        Self {
            name: request.name,
            config: request.config,
        }
    }
}

/// Query string of `GET /sources`; both filters take comma-separated values
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSourcesParams {
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub status: Option<String>,
}

impl ListSourcesParams {
    pub fn into_filter(self) -> Result<SourceFilter, ApiError> {
        Ok(SourceFilter {
            types: parse_list(self.source_type.as_deref(), "type")?,
            statuses: parse_list(self.status.as_deref(), "status")?,
        })
    }
}

fn parse_list<T>(value: Option<&str>, param: &str) -> Result<Vec<T>, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            T::from_str(s).map_err(|e| ApiError::bad_request(e.to_string()).with_param(param))
        })
        .collect()
}

/// Body of `POST /sources/{id}/documents`
#[derive(Debug, Clone, Deserialize)]
pub struct AddDocumentsApiRequest {
    pub documents: Vec<RawDocument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddDocumentsResponse {
    pub source_id: String,
    pub accepted: usize,
    /// Documents now held for the source
    pub document_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub status: SourceStatus,
    pub config: SourceConfig,
    pub item_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_indexed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&DataSource> for SourceResponse {
    fn from(source: &DataSource) -> Self {
        Self {
            id: source.id().to_string(),
            name: source.name().to_string(),
            source_type: source.source_type(),
            status: source.status(),
            config: source.config().clone(),
            item_count: source.item_count(),
            last_indexed: source.last_indexed().map(|t| t.to_rfc3339()),
            error_message: source.error_message().map(str::to_string),
            version: source.version(),
            created_at: source.created_at().to_rfc3339(),
            updated_at: source.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListSourcesResponse {
    pub sources: Vec<SourceResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_accepts_type_aliases() {
        let json = r#"{"name": "Team chat", "type": "wechat"}"#;
        let request: RegisterSourceApiRequest = serde_json::from_str(json).unwrap();
        let request = RegisterSourceRequest::try_from(request).unwrap();

        assert_eq!(request.source_type, SourceType::Chat);
        assert!(request.id.is_none());
        assert!(request.config.is_empty());
    }

    #[test]
    fn test_register_request_unknown_type() {
        let json = r#"{"name": "Faxes", "source_type": "fax"}"#;
        let request: RegisterSourceApiRequest = serde_json::from_str(json).unwrap();
        let err = RegisterSourceRequest::try_from(request).unwrap_err();

        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param.as_deref(), Some("type"));
    }

    #[test]
    fn test_edit_request_requires_version() {
        assert!(serde_json::from_str::<EditSourceApiRequest>(r#"{"name": "x"}"#).is_err());

        let request: EditSourceApiRequest =
            serde_json::from_str(r#"{"expected_version": 3, "name": "x"}"#).unwrap();
        assert_eq!(request.expected_version, 3);
        assert!(request.config.is_none());
    }

    #[test]
    fn test_list_params_into_filter() {
        let params = ListSourcesParams {
            source_type: Some("email, code".to_string()),
            status: Some("ready".to_string()),
        };
        let filter = params.into_filter().unwrap();

        assert_eq!(filter.types, vec![SourceType::Email, SourceType::Code]);
        assert_eq!(filter.statuses, vec![SourceStatus::Ready]);

        let filter = ListSourcesParams::default().into_filter().unwrap();
        assert!(filter.types.is_empty() && filter.statuses.is_empty());

        let params = ListSourcesParams {
            source_type: None,
            status: Some("done".to_string()),
        };
        assert!(params.into_filter().is_err());
    }
}
