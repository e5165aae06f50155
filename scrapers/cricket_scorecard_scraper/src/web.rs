use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::{info, warn};

use crate::{
    cache::{cache_key, ExtractionCache},
    collection::MatchCollection,
    config::ScraperConfig,
    error::ExtractionError,
    export,
    metrics::{MetricsCollector, UsageMetrics},
    scorecard_scraper::ScorecardScraper,
    types::Report,
};

/// State owned by the web shell. The extraction pipeline itself is stateless.
#[derive(Clone)]
pub struct AppState {
    pub scraper: Arc<ScorecardScraper>,
    pub metrics: MetricsCollector,
    pub cache: Arc<Mutex<ExtractionCache>>,
    pub collection: Arc<Mutex<MatchCollection>>,
}

impl AppState {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            scraper: Arc::new(ScorecardScraper::new(config)),
            metrics: MetricsCollector::new(),
            cache: Arc::new(Mutex::new(ExtractionCache::new(config.cache.capacity))),
            collection: Arc::new(Mutex::new(MatchCollection::new())),
        }
    }

    fn collection(&self) -> MutexGuard<'_, MatchCollection> {
        self.collection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache(&self) -> MutexGuard<'_, ExtractionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractRequest {
    pub html: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionStatus {
    pub matches: usize,
    pub added: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageStats {
    pub metrics: UsageMetrics,
    pub collection_size: usize,
    pub cached_results: usize,
}

#[derive(Debug)]
pub enum ApiError {
    Extraction(ExtractionError),
    Internal(String),
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        ApiError::Extraction(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Extraction(e) => write!(f, "{}", e),
            ApiError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Runs one extraction through the cache on the blocking pool, recording usage.
pub async fn run_extraction(
    state: &AppState,
    html: String,
    title: Option<String>,
) -> Result<Report, ApiError> {
    let key = cache_key(&html, title.as_deref());
    let cached = state.cache().get(&key).cloned();
    if let Some(outcome) = cached {
        state.metrics.record_cache_hit(outcome.is_ok());
        return outcome.map_err(ApiError::from);
    }

    let tracker = state.metrics.record_extraction_start();
    let scraper = Arc::clone(&state.scraper);
    let outcome = tokio::task::spawn_blocking(move || scraper.extract(&html, title.as_deref()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracker.finish(outcome.is_ok());
    if let Err(e) = &outcome {
        warn!(error = %e, "Extraction failed");
        state.metrics.record_error(e.to_string());
    }
    state.cache().insert(key, outcome.clone());

    outcome.map_err(ApiError::from)
}

#[axum::debug_handler]
pub async fn index_handler() -> Html<String> {
    Html(page("", ""))
}

/// Form submission: always answers with a page, showing the report or a readable error.
#[axum::debug_handler]
pub async fn extract_page_handler(
    State(state): State<AppState>,
    Form(request): Form<ExtractRequest>,
) -> Html<String> {
    let title = request.title.clone().unwrap_or_default();
    let body = if request.html.trim().is_empty() {
        r#"<p class="error">Please paste the full HTML first.</p>"#.to_string()
    } else {
        match run_extraction(&state, request.html, request.title).await {
            Ok(report) => render_report(&report),
            Err(e) => format!(
                r#"<p class="error">{}</p>"#,
                html_escape::encode_text(&e.to_string())
            ),
        }
    };

    Html(page(&title, &body))
}

#[axum::debug_handler]
pub async fn api_extract_handler(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<Report>, ApiError> {
    let report = run_extraction(&state, request.html, request.title).await?;
    Ok(Json(report))
}

#[axum::debug_handler]
pub async fn add_to_collection_handler(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<CollectionStatus>, ApiError> {
    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| state.collection().next_default_title());
    let report = run_extraction(&state, request.html, Some(title)).await?;

    let added = report.title.clone();
    let matches = state.collection().add(report);
    info!(title = %added, matches, "Added match to collection");

    Ok(Json(CollectionStatus {
        matches,
        added: Some(added),
    }))
}

#[axum::debug_handler]
pub async fn clear_collection_handler(State(state): State<AppState>) -> Json<CollectionStatus> {
    state.collection().clear();
    Json(CollectionStatus {
        matches: 0,
        added: None,
    })
}

#[axum::debug_handler]
pub async fn export_collection_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let csv_text = state
        .collection()
        .to_csv()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::default_export_filename(Utc::now())
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv_text,
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn stats_handler(State(state): State<AppState>) -> Json<UsageStats> {
    let collection_size = state.collection().len();
    let cached_results = state.cache().len();
    Json(UsageStats {
        metrics: state.metrics.get_metrics(),
        collection_size,
        cached_results,
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/extract", post(extract_page_handler))
        .route("/api/extract", post(api_extract_handler))
        .route("/api/collection", post(add_to_collection_handler))
        .route("/api/collection/clear", post(clear_collection_handler))
        .route("/api/collection.csv", get(export_collection_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web interface available at http://{}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Report lines as HTML; `**` emphasis from the formatter becomes `<b>`.
pub fn render_report(report: &Report) -> String {
    let lines: String = report
        .lines
        .iter()
        .skip_while(|line| line.starts_with("### "))
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>\n", emphasis_to_html(&html_escape::encode_text(line))))
        .collect();

    format!(
        "<h3>{}</h3>\n<p><em>{} vs {}</em></p>\n{}",
        html_escape::encode_text(&report.title),
        html_escape::encode_text(report.teams.first()),
        html_escape::encode_text(report.teams.second()),
        lines
    )
}

fn emphasis_to_html(line: &str) -> String {
    line.split("**")
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 {
                format!("<b>{}</b>", part)
            } else {
                part.to_string()
            }
        })
        .collect()
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Cricket Scorecard Extractor</title>
</head>
<body>
    <h1>Cricket Scorecard Extractor</h1>
    <form method="post" action="/extract">
        <p><input type="text" name="title" placeholder="Match name (optional)" value="{}" /></p>
        <p><textarea name="html" rows="20" cols="120" placeholder="Paste the full scorecard page source here"></textarea></p>
        <p><button type="submit">Extract Stats</button></p>
    </form>
    <div id="result">
{}
    </div>
    <p><a href="/api/collection.csv">Download collection (CSV)</a> | <a href="/stats">Usage</a></p>
</body>
</html>"#,
        html_escape::encode_double_quoted_attribute(title),
        body
    )
}
