pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::calendar::handlers as calendar;
use crate::planner::handlers as planner;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Study plan API
        .route("/api/v1/study-plan", post(planner::handle_generate_study_plan))
        .route(
            "/api/v1/study-plan/prompt",
            post(planner::handle_preview_prompt),
        )
        // Calendar API
        .route(
            "/api/v1/calendar/events",
            post(calendar::handle_add_to_calendar),
        )
        .with_state(state)
}
