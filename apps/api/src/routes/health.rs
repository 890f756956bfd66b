use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub model: String,
    pub calendar_enabled: bool,
}

/// GET /health
/// Reports the active model and whether calendar publishing is wired up.
/// Does not touch the database or the model.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        model: state.llm.model().to_string(),
        calendar_enabled: state.calendar.is_some(),
    })
}
