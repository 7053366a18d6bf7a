use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod charts;
pub mod filter;
pub mod handlers;
pub mod render;
pub mod state;

pub use state::{AppState, Refresher};

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/api/news", get(handlers::list_news))
        .route("/api/summary", get(handlers::summary))
        .route("/api/refresh", post(handlers::refresh))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use nd_core::{Error, NewsRecord, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use nd_core::{DocumentKind, NewsRecord};
    use nd_storage::MemoryStorage;
    use tower::ServiceExt;

    async fn app() -> Router {
        let storage = MemoryStorage::new()
            .with_document(DocumentKind::Enriched, filter::test_support::document())
            .await;
        create_app(AppState::new(Arc::new(storage)))
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_dashboard_page() {
        let (status, body) = get_body(app().await, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("News Categorization &amp; Sentiment Dashboard"));
        assert!(body.contains("Articles by Category"));
    }

    #[tokio::test]
    async fn test_news_api_applies_filters() {
        let (status, body) = get_body(app().await, "/api/news?country=gb").await;
        assert_eq!(status, StatusCode::OK);
        let records: Vec<NewsRecord> = serde_json::from_str(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].country.as_deref(), Some("gb"));
    }

    #[tokio::test]
    async fn test_submitted_form_with_empty_selection() {
        let (_, body) = get_body(app().await, "/api/news?applied=1&country=us&category=SPORTS").await;
        let records: Vec<NewsRecord> = serde_json::from_str(&body).unwrap();
        assert!(records.is_empty());

        let (_, body) = get_body(
            app().await,
            "/api/news?applied=1&country=us&category=SPORTS&sentiment=Positive",
        )
        .await;
        let records: Vec<NewsRecord> = serde_json::from_str(&body).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_summary_api() {
        let (_, body) = get_body(app().await, "/api/summary?sentiment=Positive").await;
        let summary: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary["total"], 1);
        assert_eq!(summary["categories"][0][0], "SPORTS");
    }

    #[tokio::test]
    async fn test_empty_storage_shows_message() {
        let app = create_app(AppState::new(Arc::new(MemoryStorage::new())));
        let (status, body) = get_body(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Error loading categorized news"));
        assert!(body.contains("No news data available"));
    }

    #[tokio::test]
    async fn test_refresh_without_pipeline() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
