use std::sync::Arc;

use crate::calendar::CalendarPublisher;
use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::planner::fetcher::ScheduleStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable, so concurrent requests need no locking.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ScheduleStore>,
    /// Pluggable model backend. Default: Gemini.
    pub llm: Arc<dyn TextGenerator>,
    /// `None` when no calendar access token is configured.
    pub calendar: Option<Arc<CalendarPublisher>>,
    pub config: Config,
}
