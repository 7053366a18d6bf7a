use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use nd_core::{DocumentKind, NewsRecord};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::filter::{DashboardQuery, Summary};
use crate::render::{render_dashboard, DashboardView};
use crate::AppState;

async fn load_view(state: &AppState, raw_query: Option<String>) -> DashboardView {
    let query = DashboardQuery::parse(raw_query.as_deref());
    let loaded = state.storage.load_document(DocumentKind::Enriched).await;
    if let Err(e) = &loaded {
        warn!("Error loading categorized news: {}", e);
    }
    DashboardView::build(loaded, &query).with_refresh(state.pipeline.is_some())
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Html<String> {
    Html(render_dashboard(&load_view(&state, query).await))
}

pub async fn list_news(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Json<Vec<NewsRecord>> {
    let view = load_view(&state, query).await;
    Json(view.articles.into_iter().map(|a| a.record).collect())
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Json<Summary> {
    Json(load_view(&state, query).await.summary)
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(refresher) = &state.pipeline else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "this server was started without a news pipeline" })),
        );
    };

    let _guard = refresher.lock.lock().await;
    info!("🔄 Refreshing news data");
    let report = refresher
        .pipeline
        .run(&refresher.countries, refresher.page_size)
        .await;
    (StatusCode::OK, Json(json!(report)))
}
