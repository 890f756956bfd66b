//! Calendar Publisher: maps validated study sessions 1:1 onto calendar events.
//!
//! Calendar access sits behind `CalendarApi`; the Google Calendar v3 client
//! lives in `google`. What happens when one insert in a batch fails is an
//! explicit `FailurePolicy`, never an accident of error propagation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::planner::models::StudySession;

pub mod google;
pub mod handlers;

pub const DEFAULT_CALENDAR_ID: &str = "primary";
const REMINDER_MINUTES: u32 = 15;

// ────────────────────────────────────────────────────────────────────────────
// Event model (Google Calendar v3 wire shape)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub reminders: Reminders,
}

/// Local wall-clock time plus the zone it is expressed in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

impl CalendarEvent {
    pub fn from_session(session: &StudySession, time_zone: &str) -> Self {
        Self {
            summary: format!("Study: {}", session.course_name),
            description: session.activity.clone(),
            start: EventDateTime {
                date_time: format!("{}T{}:00", session.date, session.start_time),
                time_zone: time_zone.to_string(),
            },
            end: EventDateTime {
                date_time: format!("{}T{}:00", session.date, session.end_time),
                time_zone: time_zone.to_string(),
            },
            reminders: Reminders {
                use_default: false,
                overrides: vec![ReminderOverride {
                    method: "popup".to_string(),
                    minutes: REMINDER_MINUTES,
                }],
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Event-level calendar operations. Implement this to target another
/// calendar backend without touching the publisher.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Creates the event and returns its identifier.
    async fn insert_event(&self, calendar_id: &str, event: &CalendarEvent)
        -> Result<String, AppError>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Publisher
// ────────────────────────────────────────────────────────────────────────────

/// What to do when an insert fails partway through a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Delete the events already created in this batch, then fail.
    #[default]
    AllOrNothing,
    /// Keep going; report each item's outcome.
    PerItem,
}

/// Result for one session, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    Created { event_id: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublishReport {
    pub outcomes: Vec<PublishOutcome>,
}

impl PublishReport {
    /// Identifiers of created events, in input order.
    pub fn event_ids(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                PublishOutcome::Created { event_id } => Some(event_id.clone()),
                PublishOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// `(input index, error message)` for every failed session.
    pub fn failures(&self) -> Vec<(usize, String)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, o)| match o {
                PublishOutcome::Failed { error } => Some((index, error.clone())),
                PublishOutcome::Created { .. } => None,
            })
            .collect()
    }
}

pub struct CalendarPublisher {
    api: Arc<dyn CalendarApi>,
    time_zone: String,
    policy: FailurePolicy,
}

impl CalendarPublisher {
    pub fn new(api: Arc<dyn CalendarApi>, time_zone: String, policy: FailurePolicy) -> Self {
        Self {
            api,
            time_zone,
            policy,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Publishes one event per session, sequentially and in order.
    pub async fn publish(
        &self,
        sessions: &[StudySession],
        calendar_id: &str,
    ) -> Result<PublishReport, AppError> {
        let mut report = PublishReport::default();

        for (index, session) in sessions.iter().enumerate() {
            let event = CalendarEvent::from_session(session, &self.time_zone);
            match self.api.insert_event(calendar_id, &event).await {
                Ok(event_id) => {
                    info!("Event {} created for session {}", event_id, index);
                    report.outcomes.push(PublishOutcome::Created { event_id });
                }
                Err(e) => match self.policy {
                    FailurePolicy::AllOrNothing => {
                        warn!(
                            "Insert failed for session {index}; rolling back {} created events",
                            report.outcomes.len()
                        );
                        self.roll_back(calendar_id, &report.event_ids()).await;
                        return Err(e);
                    }
                    FailurePolicy::PerItem => {
                        warn!("Insert failed for session {index}: {e}");
                        report.outcomes.push(PublishOutcome::Failed {
                            error: e.to_string(),
                        });
                    }
                },
            }
        }

        info!(
            "Published {} of {} sessions to calendar {}",
            report.event_ids().len(),
            sessions.len(),
            calendar_id
        );
        Ok(report)
    }

    /// Best effort: a failed delete is logged, not raised, so the caller
    /// still sees the insert error that triggered the rollback.
    async fn roll_back(&self, calendar_id: &str, event_ids: &[String]) {
        for event_id in event_ids.iter().rev() {
            if let Err(e) = self.api.delete_event(calendar_id, event_id).await {
                warn!("Rollback could not delete event {event_id}: {e}");
            }
        }
    }
}
