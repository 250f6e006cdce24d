//! Corpus that also reads files from a source's configured directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::InMemoryCorpus;
use crate::domain::DomainError;
use crate::domain::corpus::{MAX_DOCUMENT_BYTES, RawDocument, SourceCorpus};
use crate::domain::source::{DataSource, SourceId, SourceType};

/// Config key naming the directory to scan
pub const PATH_CONFIG_KEY: &str = "path";

const SKIPPED_DIRS: [&str; 4] = [".git", "target", "node_modules", "__pycache__"];

/// Uploaded documents plus, for document and code sources, every
/// readable UTF-8 file under the source's `path` config value
#[derive(Debug)]
pub struct FilesystemCorpus {
    uploads: InMemoryCorpus,
    max_files: usize,
}

impl FilesystemCorpus {
    pub fn new(max_files: usize) -> Self {
        Self {
            uploads: InMemoryCorpus::new(),
            max_files,
        }
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || SKIPPED_DIRS.contains(&name))
}

fn language_for(path: &Path) -> Option<&'static str> {
    let language = match path.extension()?.to_str()? {
        "rs" => "rust",
        "py" => "python",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" => "javascript",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "rb" => "ruby",
        "sh" => "shell",
        "md" => "markdown",
        _ => return None,
    };
    Some(language)
}

fn scan_directory(
    root: PathBuf,
    source_type: SourceType,
    max_files: usize,
) -> Result<Vec<RawDocument>, DomainError> {
    if !root.is_dir() {
        return Err(DomainError::not_found(format!(
            "Source directory '{}' does not exist",
            root.display()
        )));
    }

    let mut documents = Vec::new();

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if documents.len() >= max_files {
            warn!(root = %root.display(), max_files, "File limit reached, remaining files skipped");
            break;
        }

        let path = entry.path();
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size > MAX_DOCUMENT_BYTES as u64 {
            debug!(path = %path.display(), size, "Skipping oversized file");
            continue;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Skipping non-text file");
                continue;
            }
        };

        let relative = path
            .strip_prefix(&root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| relative.clone());

        let mut document = RawDocument::new(relative.clone(), content)
            .with_title(title)
            .with_metadata("path", relative);

        if let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) {
            let modified: DateTime<Utc> = modified.into();
            document = document.with_metadata("date", modified.to_rfc3339());
        }

        if source_type == SourceType::Code {
            if let Some(language) = language_for(path) {
                document = document.with_metadata("language", Value::from(language));
            }
        }

        documents.push(document);
    }

    Ok(documents)
}

#[async_trait]
impl SourceCorpus for FilesystemCorpus {
    async fn load(&self, source: &DataSource) -> Result<Vec<RawDocument>, DomainError> {
        let mut documents = self.uploads.load(source).await?;

        let scans_files = matches!(
            source.source_type(),
            SourceType::Document | SourceType::Code
        );

        if let (true, Some(path)) = (scans_files, source.config_str(PATH_CONFIG_KEY)) {
            let root = PathBuf::from(path);
            let source_type = source.source_type();
            let max_files = self.max_files;

            let scanned =
                tokio::task::spawn_blocking(move || scan_directory(root, source_type, max_files))
                    .await
                    .map_err(|e| DomainError::internal(format!("Directory scan failed: {}", e)))??;

            debug!(source_id = %source.id(), files = scanned.len(), "Scanned source directory");

            for document in scanned {
                if !documents.iter().any(|d| d.id == document.id) {
                    documents.push(document);
                }
            }
        }

        Ok(documents)
    }

    async fn add_documents(
        &self,
        source_id: &SourceId,
        documents: Vec<RawDocument>,
    ) -> Result<usize, DomainError> {
        self.uploads.add_documents(source_id, documents).await
    }

    async fn remove_source(&self, source_id: &SourceId) -> Result<(), DomainError> {
        self.uploads.remove_source(source_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::source::SourceId;

    fn source_at(dir: &Path, source_type: SourceType) -> DataSource {
        DataSource::new(
            SourceId::new("files").unwrap(),
            "Files",
            source_type,
            HashMap::from([(
                PATH_CONFIG_KEY.to_string(),
                json!(dir.to_string_lossy().to_string()),
            )]),
        )
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "project deadline friday").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        fs::write(dir.path().join("blob.bin"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_scans_text_files() {
        let dir = fixture();
        let corpus = FilesystemCorpus::new(100);

        let documents = corpus
            .load(&source_at(dir.path(), SourceType::Document))
            .await
            .unwrap();

        let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"notes.txt"));
        assert!(documents.iter().all(|d| !d.id.contains(".git")));

        let notes = documents.iter().find(|d| d.id == "notes.txt").unwrap();
        assert_eq!(notes.title.as_deref(), Some("notes.txt"));
        assert!(notes.metadata.contains_key("date"));
    }

    #[tokio::test]
    async fn test_code_sources_get_language() {
        let dir = fixture();
        let corpus = FilesystemCorpus::new(100);

        let documents = corpus
            .load(&source_at(dir.path(), SourceType::Code))
            .await
            .unwrap();

        let main = documents
            .iter()
            .find(|d| d.title.as_deref() == Some("main.rs"))
            .unwrap();
        assert_eq!(main.metadata["language"], json!("rust"));
    }

    #[tokio::test]
    async fn test_max_files() {
        let dir = fixture();
        let corpus = FilesystemCorpus::new(1);

        let documents = corpus
            .load(&source_at(dir.path(), SourceType::Document))
            .await
            .unwrap();
        assert_eq!(documents.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let corpus = FilesystemCorpus::new(10);
        let source = source_at(Path::new("/definitely/not/here"), SourceType::Document);

        let result = corpus.load(&source).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_email_sources_only_use_uploads() {
        let dir = fixture();
        let corpus = FilesystemCorpus::new(10);
        let source = source_at(dir.path(), SourceType::Email);

        corpus
            .add_documents(source.id(), vec![RawDocument::new("m1", "hello")])
            .await
            .unwrap();

        let documents = corpus.load(&source).await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, "m1");
    }
}
