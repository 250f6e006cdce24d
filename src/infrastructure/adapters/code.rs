//! Source code adapter

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use super::indexed::{IndexedAdapter, MetadataProfile, promote};
use crate::domain::source::SourceType;

pub struct CodeProfile;

impl MetadataProfile for CodeProfile {
    const SOURCE_TYPE: SourceType = SourceType::Code;

    fn shape(metadata: &mut HashMap<String, Value>) {
        promote(metadata, "path", &["file", "document_id"]);

        let path = metadata
            .get("path")
            .and_then(Value::as_str)
            .map(str::to_string);

        if let Some(path) = path {
            if !metadata.contains_key("language") {
                if let Some(ext) = Path::new(&path).extension().and_then(|e| e.to_str()) {
                    metadata.insert("language".to_string(), Value::from(ext.to_lowercase()));
                }
            }

            if !metadata.contains_key("title") {
                let name = Path::new(&path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(&path)
                    .to_string();
                metadata.insert("title".to_string(), Value::from(name));
            }
        }
    }
}

pub type CodeAdapter = IndexedAdapter<CodeProfile>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_path_drives_title_and_language() {
        let mut metadata = HashMap::from([("document_id".to_string(), json!("src/lib.RS"))]);
        CodeProfile::shape(&mut metadata);

        assert_eq!(metadata["path"], json!("src/lib.RS"));
        assert_eq!(metadata["title"], json!("lib.RS"));
        assert_eq!(metadata["language"], json!("rs"));
    }

    #[test]
    fn test_known_language_is_kept() {
        let mut metadata = HashMap::from([
            ("path".to_string(), json!("main.rs")),
            ("language".to_string(), json!("rust")),
        ]);
        CodeProfile::shape(&mut metadata);

        assert_eq!(metadata["language"], json!("rust"));
    }
}
