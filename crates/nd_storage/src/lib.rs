use nd_core::config::StorageConfig;
use nd_core::{Error, NewsStorage, Result};
use std::sync::Arc;

pub mod backends;

pub use backends::*;

pub trait StorageBackend: NewsStorage + Sized {
    fn get_error_message() -> &'static str;
    fn from_config(config: &StorageConfig) -> Result<Self>;
}

fn build<S: StorageBackend + 'static>(config: &StorageConfig) -> Result<Arc<dyn NewsStorage>> {
    let storage = S::from_config(config)
        .map_err(|e| Error::Storage(format!("{}: {}", S::get_error_message(), e)))?;
    Ok(Arc::new(storage))
}

/// Build the storage named on the command line ("json" or "memory").
pub fn create_storage(kind: &str, config: &StorageConfig) -> Result<Arc<dyn NewsStorage>> {
    match kind {
        "json" | "file" => build::<JsonFileStorage>(config),
        "memory" => build::<MemoryStorage>(config),
        other => Err(Error::Config(format!(
            "unknown storage backend '{}', expected json or memory",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_storage() {
        let config = StorageConfig::default();
        assert_eq!(create_storage("json", &config).unwrap().name(), "json");
        assert_eq!(create_storage("memory", &config).unwrap().name(), "memory");
        assert!(matches!(
            create_storage("qdrant", &config),
            Err(Error::Config(_))
        ));
    }
}
