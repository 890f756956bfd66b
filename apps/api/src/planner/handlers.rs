//! Axum route handlers for the Study Plan API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::planner::generator::{generate_study_plan, preview_prompt, PromptPreview};
use crate::planner::models::StudySession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StudyPlanRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct StudyPlanResponse {
    pub success: bool,
    pub plan_id: Uuid,
    pub schedule: Vec<StudySession>,
}

fn require_user_id(request: &StudyPlanRequest) -> Result<&str, AppError> {
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("user_id is required".to_string()));
    }
    Ok(user_id)
}

/// POST /api/v1/study-plan
///
/// Full pipeline: fetch → normalize → prompt → model → validate.
/// Returns either a fully validated schedule or an error, never a partial one.
pub async fn handle_generate_study_plan(
    State(state): State<AppState>,
    Json(request): Json<StudyPlanRequest>,
) -> Result<Json<StudyPlanResponse>, AppError> {
    let user_id = require_user_id(&request)?;

    let plan = generate_study_plan(
        state.store.as_ref(),
        state.llm.as_ref(),
        user_id,
        state.config.validation_mode,
    )
    .await?;

    Ok(Json(StudyPlanResponse {
        success: true,
        plan_id: plan.plan_id,
        schedule: plan.sessions,
    }))
}

/// POST /api/v1/study-plan/prompt
///
/// Returns the canonical request and the exact prompt without calling the model.
pub async fn handle_preview_prompt(
    State(state): State<AppState>,
    Json(request): Json<StudyPlanRequest>,
) -> Result<Json<PromptPreview>, AppError> {
    let user_id = require_user_id(&request)?;
    let preview = preview_prompt(state.store.as_ref(), user_id).await?;
    Ok(Json(preview))
}
