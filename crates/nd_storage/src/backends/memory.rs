use async_trait::async_trait;
use nd_core::config::StorageConfig;
use nd_core::{DocumentKind, Error, NewsDocument, NewsStorage, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    documents: HashMap<DocumentKind, NewsDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, kind: DocumentKind, document: &NewsDocument) {
        self.documents.insert(kind, document.clone());
    }

    pub fn get(&self, kind: DocumentKind) -> Option<NewsDocument> {
        self.documents.get(&kind).cloned()
    }
}

/// Keeps documents in process; used by tests and `--storage memory`.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document, mostly for tests and demos.
    pub async fn with_document(self, kind: DocumentKind, document: NewsDocument) -> Self {
        self.store.write().await.store(kind, &document);
        self
    }
}

impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    fn from_config(_config: &StorageConfig) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl NewsStorage for MemoryStorage {
    async fn load_document(&self, kind: DocumentKind) -> Result<NewsDocument> {
        let store = self.store.read().await;
        store
            .get(kind)
            .ok_or_else(|| Error::Storage(format!("no {} document in memory", kind)))
    }

    async fn save_document(&self, kind: DocumentKind, document: &NewsDocument) -> Result<()> {
        let mut store = self.store.write().await;
        store.store(kind, document);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
