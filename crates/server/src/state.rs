use axum::extract::FromRef;
use engine::{DeferredRemovalCoordinator, Triage};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub triage: Arc<Triage>,
    pub coordinator: Arc<DeferredRemovalCoordinator>,
}

impl FromRef<AppState> for Arc<Triage> {
    fn from_ref(state: &AppState) -> Self {
        state.triage.clone()
    }
}

impl FromRef<AppState> for Arc<DeferredRemovalCoordinator> {
    fn from_ref(state: &AppState) -> Self {
        state.coordinator.clone()
    }
}
