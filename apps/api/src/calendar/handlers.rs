//! Axum route handlers for the Calendar API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::calendar::{FailurePolicy, DEFAULT_CALENDAR_ID};
use crate::errors::AppError;
use crate::planner::models::StudySession;
use crate::planner::validator::check_values;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddToCalendarRequest {
    #[serde(default)]
    pub schedule_data: Vec<StudySession>,
    pub calendar_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarFailure {
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct AddToCalendarResponse {
    pub success: bool,
    pub policy: FailurePolicy,
    pub event_ids: Vec<String>,
    pub failures: Vec<CalendarFailure>,
}

/// POST /api/v1/calendar/events
///
/// Creates one calendar event per study session, in order. Every session
/// must carry a YYYY-MM-DD date and HH:MM times. The batch failure policy
/// comes from configuration.
pub async fn handle_add_to_calendar(
    State(state): State<AppState>,
    Json(request): Json<AddToCalendarRequest>,
) -> Result<Json<AddToCalendarResponse>, AppError> {
    if request.schedule_data.is_empty() {
        return Err(AppError::Validation(
            "schedule_data must be a non-empty array".to_string(),
        ));
    }

    // Reject the whole batch before any event exists.
    for (index, session) in request.schedule_data.iter().enumerate() {
        check_values(session).map_err(|reason| {
            AppError::Validation(format!("schedule_data[{index}]: {reason}"))
        })?;
    }

    let publisher = state.calendar.as_ref().ok_or_else(|| {
        AppError::Configuration("GOOGLE_CALENDAR_ACCESS_TOKEN is not set".to_string())
    })?;

    let calendar_id = request
        .calendar_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_CALENDAR_ID);

    let report = publisher.publish(&request.schedule_data, calendar_id).await?;
    let failures: Vec<CalendarFailure> = report
        .failures()
        .into_iter()
        .map(|(index, error)| CalendarFailure { index, error })
        .collect();

    Ok(Json(AddToCalendarResponse {
        success: failures.is_empty(),
        policy: publisher.policy(),
        event_ids: report.event_ids(),
        failures,
    }))
}
