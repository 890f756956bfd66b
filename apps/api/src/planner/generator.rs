//! Study plan generation: orchestrates the full pipeline for one user.
//!
//! Flow: fetch records → normalize → build prompt → model call → validate.
//!
//! Stages run strictly in order. Any failure is logged and returned as-is;
//! a partial schedule is never produced.

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{GenerationConfig, TextGenerator};
use crate::planner::fetcher::ScheduleStore;
use crate::planner::models::{CanonicalRequest, StudySession};
use crate::planner::normalizer::normalize;
use crate::planner::prompt_builder::build_study_plan_prompt;
use crate::planner::validator::{parse_schedule, ValidationMode};

/// A validated schedule for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct StudyPlan {
    pub plan_id: Uuid,
    pub user_id: String,
    pub sessions: Vec<StudySession>,
}

/// Prompt preview: everything up to, but not including, the model call.
#[derive(Debug, Clone, Serialize)]
pub struct PromptPreview {
    pub request: CanonicalRequest,
    pub prompt: String,
}

pub async fn generate_study_plan(
    store: &dyn ScheduleStore,
    llm: &dyn TextGenerator,
    user_id: &str,
    mode: ValidationMode,
) -> Result<StudyPlan, AppError> {
    let plan_id = Uuid::new_v4();
    let result = run_pipeline(store, llm, user_id, mode).await;

    match result {
        Ok(sessions) => {
            info!(
                "Generated study plan {} with {} sessions for user {}",
                plan_id,
                sessions.len(),
                user_id
            );
            Ok(StudyPlan {
                plan_id,
                user_id: user_id.to_string(),
                sessions,
            })
        }
        Err(e) => {
            error!("Study plan {} for user {} failed: {}", plan_id, user_id, e);
            Err(e)
        }
    }
}

async fn run_pipeline(
    store: &dyn ScheduleStore,
    llm: &dyn TextGenerator,
    user_id: &str,
    mode: ValidationMode,
) -> Result<Vec<StudySession>, AppError> {
    let PromptPreview { request, prompt } = preview_prompt(store, user_id).await?;
    info!(
        "Prompt built for user {}: {} courses, {} existing blocks, {} chars",
        user_id,
        request.courses.len(),
        request.existing_schedule.len(),
        prompt.len()
    );

    info!("Requesting schedule from model {}", llm.model());
    let text = llm.generate(&prompt, &GenerationConfig::default()).await?;

    parse_schedule(&text, mode)
}

/// Runs fetch → normalize → prompt for a user without calling the model.
pub async fn preview_prompt(
    store: &dyn ScheduleStore,
    user_id: &str,
) -> Result<PromptPreview, AppError> {
    let records = store.fetch_user_records(user_id).await?;
    let request = normalize(&records)?;
    let prompt = build_study_plan_prompt(&request)?;
    Ok(PromptPreview { request, prompt })
}
