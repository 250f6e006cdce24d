//! Document source adapter

use std::collections::HashMap;

use serde_json::Value;

use super::indexed::{IndexedAdapter, MetadataProfile, promote};
use crate::domain::source::SourceType;

/// Local documents: files and uploaded texts
pub struct DocumentProfile;

impl MetadataProfile for DocumentProfile {
    const SOURCE_TYPE: SourceType = SourceType::Document;

    fn shape(metadata: &mut HashMap<String, Value>) {
        promote(metadata, "title", &["file_name", "filename", "path"]);
        promote(metadata, "author", &["creator", "owner"]);
        promote(metadata, "date", &["modified", "created"]);
    }
}

pub type DocumentAdapter = IndexedAdapter<DocumentProfile>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_title_falls_back_to_path() {
        let mut metadata = HashMap::from([
            ("path".to_string(), json!("reports/q3.md")),
            ("creator".to_string(), json!("ana")),
        ]);
        DocumentProfile::shape(&mut metadata);

        assert_eq!(metadata["title"], json!("reports/q3.md"));
        assert_eq!(metadata["author"], json!("ana"));
    }

    #[test]
    fn test_existing_title_is_kept() {
        let mut metadata = HashMap::from([
            ("title".to_string(), json!("Quarterly report")),
            ("path".to_string(), json!("q3.md")),
        ]);
        DocumentProfile::shape(&mut metadata);

        assert_eq!(metadata["title"], json!("Quarterly report"));
    }
}
