//! Prompt Builder: embeds a `CanonicalRequest` into the study plan template.

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ARRAY_ONLY_INSTRUCTION;
use crate::planner::models::CanonicalRequest;
use crate::planner::prompts::STUDY_PLAN_PROMPT_TEMPLATE;

/// Serializes the request as pretty JSON, exactly as embedded in the prompt.
pub fn serialize_request(request: &CanonicalRequest) -> Result<String, AppError> {
    serde_json::to_string_pretty(request)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize request: {e}")))
}

/// Builds the full prompt. Deterministic for a given request.
pub fn build_study_plan_prompt(request: &CanonicalRequest) -> Result<String, AppError> {
    let request_json = serialize_request(request)?;

    Ok(STUDY_PLAN_PROMPT_TEMPLATE
        .replace("{json_only_instruction}", JSON_ARRAY_ONLY_INSTRUCTION)
        .replace("{request_json}", &request_json))
}
