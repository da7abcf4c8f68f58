//! Search API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use coursedex_core::{IngestOutcome, IngestReport, SearchResults};

use super::ErrorResponse;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

impl SearchParams {
    /// The search term, or a 400 response when it is missing or blank.
    fn term(&self) -> Result<&str, ApiError> {
        match self.query.as_deref() {
            Some(q) if !q.trim().is_empty() => Ok(q),
            _ => Err(bad_request("query parameter is required")),
        }
    }
}

/// Unwrap the query string, turning axum's plain-text rejection (e.g. a
/// repeated `query` key) into the JSON error body.
fn search_params(
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<SearchParams, ApiError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| bad_request(&rejection.body_text()))
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /search?query=X
///
/// Fetch courses for the term from the catalog and store them.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<(StatusCode, Json<IngestReport>), ApiError> {
    let params = search_params(params)?;
    let term = params.term()?;

    match state.ingestor().ingest(term).await {
        Ok(report) => {
            let status = match report.outcome() {
                IngestOutcome::Complete => StatusCode::OK,
                IngestOutcome::Partial => StatusCode::MULTI_STATUS,
                IngestOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status != StatusCode::OK {
                warn!(
                    query = %report.query,
                    failed = report.failures.len(),
                    fetched = report.fetched,
                    "Ingestion finished with failures"
                );
            }
            Ok((status, Json(report)))
        }
        Err(e) => {
            error!(query = %term, error = %e, transient = e.is_transient(), "Ingestion failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// GET /search?query=X
///
/// Stored courses for the term, with their authors.
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResults>, ApiError> {
    let params = search_params(params)?;
    let term = params.term()?;

    match state.query().search(term).await {
        Ok(results) => {
            info!(query = %term, count = results.elements.len(), "Search served");
            Ok(Json(results))
        }
        Err(e) => {
            error!(query = %term, error = %e, transient = e.is_transient(), "Search failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
