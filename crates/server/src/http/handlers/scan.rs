use axum::{extract::State, http::StatusCode, Json};
use domain::FilterCriteria;
use engine::{ScanError, ScanReport, Triage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

#[derive(Deserialize)]
pub struct ScanRequest {
    pub actor: String,
    #[serde(default)]
    pub criteria: FilterCriteria,
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: ScanReport,
}

pub async fn scan(
    State(triage): State<Arc<Triage>>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, (StatusCode, String)> {
    if payload.actor.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Missing actor".to_string()));
    }

    let report = triage
        .scan(&payload.actor, &payload.criteria)
        .await
        .map_err(scan_error)?;

    Ok(Json(ScanResponse {
        message: report.message(),
        report,
    }))
}

/// Maps a scan failure onto the response shown to the moderator.
fn scan_error(e: ScanError) -> (StatusCode, String) {
    let status = match &e {
        ScanError::PermissionDenied => StatusCode::FORBIDDEN,
        ScanError::InvalidCriteria(_) => StatusCode::BAD_REQUEST,
        ScanError::Queue(cause) | ScanError::Store(cause) => {
            error!("{}: {:#}", e, cause);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}
