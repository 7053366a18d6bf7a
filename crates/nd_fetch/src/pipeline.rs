use nd_core::{Config, DocumentKind, NewsStorage, Result};
use nd_inference::{load_or_fallback, Categorizer, SentimentAnalyzer, Task};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::client::NewsApiClient;
use crate::fetcher::NewsFetcher;

const NO_NEWS_MESSAGE: &str = "No news data found in the input file.";

/// How far one `run` got; a `None` stage failed and was logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub fetched: Option<usize>,
    pub categorized: Option<usize>,
    pub analyzed: Option<usize>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.fetched.is_some() && self.categorized.is_some() && self.analyzed.is_some()
    }
}

/// fetch -> categorize -> sentiment, each stage reading the previous stage's
/// document back from storage.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: NewsFetcher,
    categorizer: Categorizer,
    sentiment: SentimentAnalyzer,
    storage: Arc<dyn NewsStorage>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("fetcher", &self.fetcher)
            .field("categorizer", &self.categorizer)
            .field("sentiment", &self.sentiment)
            .field("storage", &self.storage.name())
            .finish()
    }
}

impl Pipeline {
    pub fn new(
        fetcher: NewsFetcher,
        categorizer: Categorizer,
        sentiment: SentimentAnalyzer,
        storage: Arc<dyn NewsStorage>,
    ) -> Self {
        Self {
            fetcher,
            categorizer,
            sentiment,
            storage,
        }
    }

    /// Fails only when no API key can be resolved; missing model files fall
    /// back to the default labels.
    pub fn from_config(config: &Config, storage: Arc<dyn NewsStorage>) -> Result<Self> {
        let api_key = config.news_api.resolve_api_key()?;
        Self::from_parts(config, api_key, storage)
    }

    /// Like [`Pipeline::from_config`] with an explicit key. The categorize and
    /// sentiment stages never call the API, so they can run with an empty one.
    pub fn from_parts(config: &Config, api_key: String, storage: Arc<dyn NewsStorage>) -> Result<Self> {
        let client = NewsApiClient::new(
            &config.news_api.base_url,
            api_key,
            Duration::from_secs(config.news_api.timeout_seconds),
        )?;
        let category_model = load_or_fallback(&config.models.category_path, Task::Category);
        let sentiment_model = load_or_fallback(&config.models.sentiment_path, Task::Sentiment);
        Ok(Self::new(
            NewsFetcher::new(client),
            Categorizer::new(category_model),
            SentimentAnalyzer::new(sentiment_model),
            storage,
        ))
    }

    pub async fn fetch(&self, countries: &[String], page_size: u32) -> Result<usize> {
        let document = self.fetcher.collect_news(countries, page_size).await;
        self.storage.save_document(DocumentKind::Raw, &document).await?;
        Ok(document.len())
    }

    pub async fn categorize(&self) -> Result<usize> {
        let mut document = self.storage.load_document(DocumentKind::Raw).await?;
        if document.news_missing {
            info!("{}", NO_NEWS_MESSAGE);
            return Ok(0);
        }
        let predicted = self.categorizer.categorize(&mut document);
        self.storage
            .save_document(DocumentKind::Enriched, &document)
            .await?;
        info!(
            "Categorized {} articles ({} by {}) in {} storage",
            document.len(),
            predicted,
            self.categorizer.model_name(),
            self.storage.name()
        );
        Ok(document.len())
    }

    pub async fn analyze_sentiment(&self) -> Result<usize> {
        let mut document = self.storage.load_document(DocumentKind::Enriched).await?;
        if document.news_missing {
            info!("{}", NO_NEWS_MESSAGE);
            return Ok(0);
        }
        let predicted = self.sentiment.analyze(&mut document);
        self.storage
            .save_document(DocumentKind::Enriched, &document)
            .await?;
        info!(
            "Sentiment added to {} articles ({} by {}) in {} storage",
            document.len(),
            predicted,
            self.sentiment.model_name(),
            self.storage.name()
        );
        Ok(document.len())
    }

    /// All three stages in order. A failing stage is logged and the next one
    /// still runs against whatever storage holds.
    pub async fn run(&self, countries: &[String], page_size: u32) -> RunReport {
        info!("🚀 Running news pipeline for {}", countries.join(", "));
        let report = RunReport {
            fetched: log_stage("fetching news", self.fetch(countries, page_size).await),
            categorized: log_stage("categorizing news", self.categorize().await),
            analyzed: log_stage("adding sentiment to news", self.analyze_sentiment().await),
        };
        if report.is_complete() {
            info!("✅ Pipeline finished: {} articles", report.fetched.unwrap_or(0));
        }
        report
    }
}

fn log_stage(stage: &str, result: Result<usize>) -> Option<usize> {
    match result {
        Ok(count) => Some(count),
        Err(e) => {
            error!("❌ Error {}: {}", stage, e);
            None
        }
    }
}
