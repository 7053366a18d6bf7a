use async_trait::async_trait;
use nd_core::config::StorageConfig;
use nd_core::{DocumentKind, Error, NewsDocument, NewsStorage, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::StorageBackend;

/// Stores each document as a pretty-printed JSON file, overwritten on save.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    raw_path: PathBuf,
    enriched_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(raw_path: impl Into<PathBuf>, enriched_path: impl Into<PathBuf>) -> Self {
        Self {
            raw_path: raw_path.into(),
            enriched_path: enriched_path.into(),
        }
    }

    pub fn path_for(&self, kind: DocumentKind) -> &Path {
        match kind {
            DocumentKind::Raw => &self.raw_path,
            DocumentKind::Enriched => &self.enriched_path,
        }
    }
}

/// Four-space indentation, non-ASCII written as-is.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

impl StorageBackend for JsonFileStorage {
    fn get_error_message() -> &'static str {
        "JSON documents should be readable and writable in the working directory"
    }

    fn from_config(config: &StorageConfig) -> Result<Self> {
        Ok(Self::new(config.raw_path.clone(), config.enriched_path.clone()))
    }
}

#[async_trait]
impl NewsStorage for JsonFileStorage {
    async fn load_document(&self, kind: DocumentKind) -> Result<NewsDocument> {
        let path = self.path_for(kind);
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::Storage(format!(
                    "no {} document at {}",
                    kind,
                    path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&data)?)
    }

    async fn save_document(&self, kind: DocumentKind, document: &NewsDocument) -> Result<()> {
        let path = self.path_for(kind);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, to_pretty_json(document)?).await?;
        info!("News data saved to {}", path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::NewsRecord;

    fn sample_document() -> NewsDocument {
        let mut doc = NewsDocument::new(&["de".to_string()]);
        doc.news.push(NewsRecord {
            country: Some("de".to_string()),
            title: Some("Bürgermeister eröffnet Brücke".to_string()),
            source: Some("Tagesschau".to_string()),
            ..Default::default()
        });
        doc
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(
            dir.path().join("raw.json"),
            dir.path().join("out/enriched.json"),
        );
        let doc = sample_document();

        storage.save_document(DocumentKind::Raw, &doc).await.unwrap();
        storage.save_document(DocumentKind::Enriched, &doc).await.unwrap();

        assert_eq!(storage.load_document(DocumentKind::Raw).await.unwrap(), doc);
        assert_eq!(storage.load_document(DocumentKind::Enriched).await.unwrap(), doc);
    }

    #[tokio::test]
    async fn test_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("raw.json"), dir.path().join("e.json"));
        storage
            .save_document(DocumentKind::Raw, &sample_document())
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("raw.json")).unwrap();
        assert!(text.contains("\n    \"header\": {"));
        assert!(text.contains("Bürgermeister"));
        assert!(text.contains("\"publishedAt\": null"));
    }

    #[tokio::test]
    async fn test_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("a.json"), dir.path().join("b.json"));
        let err = storage.load_document(DocumentKind::Enriched).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "{not json").unwrap();
        let storage = JsonFileStorage::new(dir.path().join("a.json"), dir.path().join("b.json"));
        let err = storage.load_document(DocumentKind::Raw).await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
