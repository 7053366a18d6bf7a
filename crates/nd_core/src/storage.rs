use async_trait::async_trait;
use crate::types::{DocumentKind, NewsDocument};
use crate::Result;

#[async_trait]
pub trait NewsStorage: Send + Sync {
    /// Load a previously saved document
    async fn load_document(&self, kind: DocumentKind) -> Result<NewsDocument>;

    /// Overwrite the document of the given kind
    async fn save_document(&self, kind: DocumentKind, document: &NewsDocument) -> Result<()>;

    /// Short backend name used in logs
    fn name(&self) -> &str;
}
