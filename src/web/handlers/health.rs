//! Health check HTTP handler

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use crate::web::{
    responses::{handle_error, ok, HealthStatus},
    AppState,
};

/// Report service status along with cache and worker pool figures
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.avatars.get().await {
        Ok(service) => ok(HealthStatus::healthy(service.stats().await)).into_response(),
        Err(e) => handle_error(e),
    }
}
