pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use models::Classifier;
pub use storage::NewsStorage;
pub use types::{
    DocumentHeader, DocumentKind, NewsDocument, NewsRecord, NEUTRAL_SENTIMENT, UNKNOWN_CATEGORY,
};
