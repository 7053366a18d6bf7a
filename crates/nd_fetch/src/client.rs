//! Thin client for a NewsAPI-compatible headline service.

use nd_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::logging::Logger;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// An article as the provider returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiArticle {
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadlinesResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "totalResults", default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<ApiArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceInfo>,
}

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        Url::parse_with_params(&format!("{}/{}", self.base_url, path), params)
            .map_err(|e| Error::Fetch(format!("invalid URL for {}: {}", path, e)))
    }

    /// Provider errors arrive as `{"status": "error", "code", "message"}`
    /// regardless of the HTTP status, so the body decides.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body: serde_json::Value = self
            .http
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?
            .json()
            .await?;

        if body.get("status").and_then(|s| s.as_str()) == Some("error") {
            let field = |name: &str| {
                body.get(name)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            return Err(Error::Api {
                code: field("code"),
                message: field("message"),
            });
        }
        Ok(serde_json::from_value(body)?)
    }

    pub async fn top_headlines(&self, country: &str, page_size: u32) -> Result<HeadlinesResponse> {
        let url = self.endpoint(
            "top-headlines",
            &[
                ("country", country.to_string()),
                ("pageSize", page_size.to_string()),
            ],
        )?;
        let response: HeadlinesResponse = self.get(url).await?;
        Logger::new().with_prefix(format!("[{}]", country)).info(&format!(
            "status={}, totalResults={}",
            response.status.as_deref().unwrap_or("None"),
            response.total_results
        ));
        Ok(response)
    }

    pub async fn sources(&self, country: &str) -> Result<SourcesResponse> {
        let url = self.endpoint("top-headlines/sources", &[("country", country.to_string())])?;
        self.get(url).await
    }

    pub async fn top_headlines_from_sources(
        &self,
        source_ids: &[String],
        page_size: u32,
    ) -> Result<HeadlinesResponse> {
        let url = self.endpoint(
            "top-headlines",
            &[
                ("sources", source_ids.join(",")),
                ("pageSize", page_size.to_string()),
            ],
        )?;
        self.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> NewsApiClient {
        NewsApiClient::new(&server.url(), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_top_headlines() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/top-headlines")
            .match_header("x-api-key", "test-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("country".into(), "us".into()),
                Matcher::UrlEncoded("pageSize".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "status": "ok",
                    "totalResults": 1,
                    "articles": [{
                        "source": {"id": null, "name": "Reuters"},
                        "title": "Markets rally",
                        "description": null,
                        "url": "https://example.com/a",
                        "publishedAt": "2024-05-01T10:00:00Z"
                    }]
                }"#,
            )
            .create_async()
            .await;

        let response = client(&server).top_headlines("us", 10).await.unwrap();
        assert_eq!(response.total_results, 1);
        let article = &response.articles[0];
        assert_eq!(article.title.as_deref(), Some("Markets rally"));
        assert_eq!(article.description, None);
        assert_eq!(
            article.source.as_ref().and_then(|s| s.name.as_deref()),
            Some("Reuters")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_becomes_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/top-headlines")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#)
            .create_async()
            .await;

        let err = client(&server).top_headlines("us", 10).await.unwrap_err();
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, "apiKeyInvalid");
                assert!(message.contains("invalid"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sources_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/top-headlines/sources")
            .match_query(Matcher::UrlEncoded("country".into(), "de".into()))
            .with_body(r#"{"status":"ok","sources":[{"id":"spiegel","name":"Spiegel"}]}"#)
            .create_async()
            .await;

        let response = client(&server).sources("de").await.unwrap();
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].id.as_deref(), Some("spiegel"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_headlines_from_sources_joins_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/top-headlines")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sources".into(), "bild,spiegel".into()),
                Matcher::UrlEncoded("pageSize".into(), "5".into()),
            ]))
            .with_body(r#"{"status":"ok","totalResults":0,"articles":[]}"#)
            .create_async()
            .await;

        let ids = vec!["bild".to_string(), "spiegel".to_string()];
        let response = client(&server).top_headlines_from_sources(&ids, 5).await.unwrap();
        assert!(response.articles.is_empty());
        mock.assert_async().await;
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let client = NewsApiClient::new("https://newsapi.org/v2/", "k", Duration::from_secs(1)).unwrap();
        let url = client
            .endpoint("top-headlines", &[("country", "gb".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "https://newsapi.org/v2/top-headlines?country=gb");
    }
}
