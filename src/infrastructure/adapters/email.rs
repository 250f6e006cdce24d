//! Email source adapter

use std::collections::HashMap;

use serde_json::Value;

use super::indexed::{IndexedAdapter, MetadataProfile, promote};
use crate::domain::source::SourceType;

pub struct EmailProfile;

impl MetadataProfile for EmailProfile {
    const SOURCE_TYPE: SourceType = SourceType::Email;

    fn shape(metadata: &mut HashMap<String, Value>) {
        promote(metadata, "title", &["subject"]);
        promote(metadata, "author", &["from", "sender"]);
        promote(metadata, "contact", &["from", "sender", "to"]);
        promote(metadata, "date", &["sent_at", "received_at"]);
    }
}

pub type EmailAdapter = IndexedAdapter<EmailProfile>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_email_headers_are_mapped() {
        let mut metadata = HashMap::from([
            ("subject".to_string(), json!("Re: deadline")),
            ("from".to_string(), json!("bo@example.com")),
            ("sent_at".to_string(), json!("2024-05-01T09:00:00Z")),
        ]);
        EmailProfile::shape(&mut metadata);

        assert_eq!(metadata["title"], json!("Re: deadline"));
        assert_eq!(metadata["author"], json!("bo@example.com"));
        assert_eq!(metadata["contact"], json!("bo@example.com"));
        assert_eq!(metadata["date"], json!("2024-05-01T09:00:00Z"));
    }
}
