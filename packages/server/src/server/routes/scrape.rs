//! The event-scrape endpoint.
//!
//! Runs the pipeline strictly in order (fetch, extract, normalize)
//! and maps each failure class to its response shape. Input errors
//! are rejected before any browser session is opened.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use url::Url;

use scrape::{EventRecord, ExtractionStatus, FetchError, Platform};

use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    #[serde(default)]
    pub event_link: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    pub success: bool,
    pub data: EventRecord,
    pub platform: Platform,
    pub content_length: usize,
    pub extraction_status: ExtractionStatus,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            stack: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
            stack: None,
        }
    }
}

/// `POST /event-scrape` — scrape one event page into a structured record.
pub async fn scrape_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Response {
    let link = match request.event_link {
        Some(link) if !link.trim().is_empty() => link,
        _ => {
            warn!("Scrape request without event link");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Event link is required")),
            )
                .into_response();
        }
    };

    let url = match Url::parse(&link) {
        Ok(url) => url,
        Err(e) => {
            warn!(link = %link, error = %e, "Unparseable event link");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Invalid URL format")),
            )
                .into_response();
        }
    };

    let platform = Platform::from_url(&url);
    info!(url = %url, platform = %platform, "Scraping event page");

    let page = match state.fetcher.fetch_page_text(&url).await {
        Ok(page) => page,
        Err(FetchError::Launch(details)) => {
            error!(error = %details, "Browser launch failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_details("Failed to launch browser", details)),
            )
                .into_response();
        }
        Err(e) => {
            error!(url = %url, error = %e, "Scrape failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_details(
                    "Failed to scrape event data",
                    e.to_string(),
                )),
            )
                .into_response();
        }
    };

    let content_length = page.text.chars().count();
    info!(
        content_length,
        strategy = %page.strategy,
        "Page content scraped"
    );

    let outcome = state
        .extractor
        .extract(&page.text, platform, &state.categories)
        .await;

    (
        StatusCode::OK,
        Json(ScrapeResponse {
            success: true,
            data: outcome.record,
            platform,
            content_length,
            extraction_status: outcome.status,
        }),
    )
        .into_response()
}
