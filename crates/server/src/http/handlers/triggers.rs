use axum::{extract::State, http::StatusCode, Json};
use domain::ModActionEvent;
use engine::{DeferredRemovalCoordinator, TriggerOutcome};
use std::sync::Arc;
use tracing::error;

pub async fn mod_action(
    State(coordinator): State<Arc<DeferredRemovalCoordinator>>,
    Json(event): Json<ModActionEvent>,
) -> Result<Json<TriggerOutcome>, (StatusCode, String)> {
    coordinator
        .handle_mod_action(&event)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Mod action '{}' failed: {:#}", event.action, e);
            trigger_failure()
        })
}

fn trigger_failure() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "An error occurred handling the mod action".to_string(),
    )
}
