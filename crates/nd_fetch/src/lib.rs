pub mod client;
pub mod fetcher;
pub mod logging;
pub mod pipeline;

pub use client::NewsApiClient;
pub use fetcher::NewsFetcher;
pub use logging::{init_logging, Logger};
pub use pipeline::{Pipeline, RunReport};

pub mod prelude {
    pub use super::client::{ApiArticle, NewsApiClient};
    pub use super::fetcher::NewsFetcher;
    pub use super::pipeline::{Pipeline, RunReport};
    pub use nd_core::{Error, NewsDocument, NewsRecord, Result};
}
