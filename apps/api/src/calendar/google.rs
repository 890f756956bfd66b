//! Google Calendar v3 REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::calendar::{CalendarApi, CalendarEvent};
use crate::errors::AppError;

const GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    id: String,
    html_link: Option<String>,
}

/// Authenticates with a bearer access token. Obtaining and refreshing the
/// token is the caller's concern.
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String, timeout: Duration) -> Result<Self, AppError> {
        Self::with_base_url(access_token, GOOGLE_CALENDAR_API_URL, timeout)
    }

    pub fn with_base_url(
        access_token: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        if access_token.trim().is_empty() {
            return Err(AppError::Configuration(
                "Google Calendar access token is not configured".to_string(),
            ));
        }
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::Configuration(format!("invalid calendar base URL '{base_url}': {e}"))
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            access_token,
            base_url,
        })
    }

    /// `{base}/calendars/{calendar_id}/events[/{event_id}]`, percent-encoded.
    fn events_url(&self, calendar_id: &str, event_id: Option<&str>) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                AppError::Configuration("calendar base URL cannot carry a path".to_string())
            })?;
            segments.pop_if_empty().extend(["calendars", calendar_id, "events"]);
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.events_url(calendar_id, None)?)
            .bearer_auth(&self.access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("calendar insert failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Calendar(format!(
                "insert returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let created: InsertedEvent = response
            .json()
            .await
            .map_err(|e| AppError::Calendar(format!("unexpected insert response: {e}")))?;
        debug!(
            "Calendar event created: {}",
            created.html_link.as_deref().unwrap_or(&created.id)
        );
        Ok(created.id)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.events_url(calendar_id, Some(event_id))?)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("calendar delete failed: {e}")))?;

        let status = response.status();
        // Already gone counts as deleted.
        if status.is_success() || status == StatusCode::GONE || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Calendar(format!(
            "delete of {event_id} returned {}: {body}",
            status.as_u16()
        )))
    }
}
