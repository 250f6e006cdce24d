//! Browser history adapter

use std::collections::HashMap;

use serde_json::Value;

use super::indexed::{IndexedAdapter, MetadataProfile, promote};
use crate::domain::source::SourceType;

pub struct BrowserProfile;

impl MetadataProfile for BrowserProfile {
    const SOURCE_TYPE: SourceType = SourceType::Browser;

    fn shape(metadata: &mut HashMap<String, Value>) {
        promote(metadata, "url", &["link", "href", "document_id"]);
        promote(metadata, "title", &["page_title", "url"]);
        promote(metadata, "date", &["visited_at", "last_visit"]);
    }
}

pub type BrowserAdapter = IndexedAdapter<BrowserProfile>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_url_is_title_fallback() {
        let mut metadata = HashMap::from([
            ("href".to_string(), json!("https://example.com/a")),
            ("visited_at".to_string(), json!("2024-05-01")),
        ]);
        BrowserProfile::shape(&mut metadata);

        assert_eq!(metadata["url"], json!("https://example.com/a"));
        assert_eq!(metadata["title"], json!("https://example.com/a"));
        assert_eq!(metadata["date"], json!("2024-05-01"));
    }
}
