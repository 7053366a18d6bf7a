use nd_core::{NewsDocument, NewsRecord, Result};

use crate::client::{ApiArticle, NewsApiClient};
use crate::logging::Logger;

impl ApiArticle {
    pub fn into_record(self, country: &str) -> NewsRecord {
        NewsRecord {
            country: Some(country.to_string()),
            title: self.title,
            description: self.description,
            url: self.url,
            published_at: self.published_at,
            source: self.source.and_then(|s| s.name),
            predicted_category: None,
            sentiment: None,
        }
    }
}

/// Collects the latest headlines, one country at a time.
#[derive(Debug, Clone)]
pub struct NewsFetcher {
    client: NewsApiClient,
}

impl NewsFetcher {
    pub fn new(client: NewsApiClient) -> Self {
        Self { client }
    }

    async fn try_fetch(&self, country: &str, page_size: u32) -> Result<Vec<ApiArticle>> {
        let response = self.client.top_headlines(country, page_size).await?;
        if response.total_results > 0 {
            return Ok(response.articles);
        }

        let source_ids: Vec<String> = self
            .client
            .sources(country)
            .await?
            .sources
            .into_iter()
            .filter_map(|s| s.id)
            .collect();
        let logger = Logger::new().with_prefix(format!("[{}]", country));
        logger.debug(&format!("no headlines, {} sources to try", source_ids.len()));
        if source_ids.is_empty() {
            return Ok(Vec::new());
        }

        let fallback = self
            .client
            .top_headlines_from_sources(&source_ids, page_size)
            .await?;
        logger
            .with_new_prefixes(format!("[{}-fallback]", country))
            .info(&format!("totalResults={}", fallback.total_results));
        Ok(fallback.articles)
    }

    /// Top headlines for `country`, falling back to the country's sources when
    /// the provider reports no results. Errors are logged and yield nothing.
    pub async fn fetch_latest_headlines(&self, country: &str, page_size: u32) -> Vec<ApiArticle> {
        match self.try_fetch(country, page_size).await {
            Ok(articles) => articles,
            Err(e) => {
                Logger::new()
                    .with_prefix(format!("[{}]", country))
                    .error(&format!("Error fetching headlines for {}: {}", country, e));
                Vec::new()
            }
        }
    }

    pub async fn collect_news(&self, countries: &[String], page_size: u32) -> NewsDocument {
        let mut document = NewsDocument::new(countries);
        for country in countries {
            let upper = country.to_uppercase();
            tracing::info!("Fetching news for {}...", upper);
            let articles = self.fetch_latest_headlines(country, page_size).await;
            tracing::info!("Fetched {} articles for {}", articles.len(), upper);
            document
                .news
                .extend(articles.into_iter().map(|a| a.into_record(country)));
        }
        document
    }
}
