//! Chat history source adapter

use std::collections::HashMap;

use serde_json::Value;

use super::indexed::{IndexedAdapter, MetadataProfile, promote};
use crate::domain::source::SourceType;

pub struct ChatProfile;

impl MetadataProfile for ChatProfile {
    const SOURCE_TYPE: SourceType = SourceType::Chat;

    fn shape(metadata: &mut HashMap<String, Value>) {
        promote(metadata, "contact", &["sender", "chat", "room"]);
        promote(metadata, "author", &["sender"]);
        promote(metadata, "title", &["contact", "room"]);
        promote(metadata, "date", &["timestamp", "sent_at"]);
    }
}

pub type ChatAdapter = IndexedAdapter<ChatProfile>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_contact_becomes_title() {
        let mut metadata = HashMap::from([
            ("sender".to_string(), json!("Li Wei")),
            ("timestamp".to_string(), json!("2024-05-01 10:00")),
        ]);
        ChatProfile::shape(&mut metadata);

        assert_eq!(metadata["contact"], json!("Li Wei"));
        assert_eq!(metadata["title"], json!("Li Wei"));
        assert_eq!(metadata["date"], json!("2024-05-01 10:00"));
    }
}
