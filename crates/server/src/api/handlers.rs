use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use coursedex_core::StoreStats;

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StoreStats>,
}

/// Liveness plus a database round trip reporting row counts. 503 when the
/// store is unreachable.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let check = tokio::task::spawn_blocking(move || {
        let store = state.store();
        store.ping()?;
        store.stats()
    })
    .await;

    match check {
        Ok(Ok(stats)) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                database: "ok".to_string(),
                stats: Some(stats),
            }),
        ),
        Ok(Err(e)) => {
            warn!(error = %e, transient = e.is_transient(), "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".to_string(),
                    database: "unavailable".to_string(),
                    stats: None,
                }),
            )
        }
        Err(e) => {
            warn!(error = %e, "Health check task failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".to_string(),
                    database: "unavailable".to_string(),
                    stats: None,
                }),
            )
        }
    }
}

/// Prometheus text exposition.
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
