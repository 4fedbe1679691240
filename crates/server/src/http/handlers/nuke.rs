use axum::{extract::State, http::StatusCode, Json};
use engine::{NukeReport, Triage};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

#[derive(Deserialize)]
pub struct NukeRequest {
    pub actor: String,
}

/// Applies the batch saved by the actor's last scan.
pub async fn nuke(
    State(triage): State<Arc<Triage>>,
    Json(payload): Json<NukeRequest>,
) -> Result<Json<NukeReport>, (StatusCode, String)> {
    if payload.actor.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Missing actor".to_string()));
    }

    triage.confirm(&payload.actor).await.map(Json).map_err(|e| {
        error!("Nuke for u/{} failed: {:#}", payload.actor, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "An error occurred nuking the modqueue".to_string(),
        )
    })
}
