use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type shared by every pipeline stage.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or unusable credentials/configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A fetched user record is malformed or missing a required field.
    #[error("Data shape error: {0}")]
    DataShape(String),

    /// The model endpoint answered with a non-success status.
    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    /// The model endpoint answered, but not with the expected envelope.
    #[error("Upstream format error: {0}")]
    UpstreamFormat(String),

    /// The model's text is not parseable JSON.
    #[error("Response parse error: {0}")]
    ResponseParse(#[source] serde_json::Error),

    /// The model's JSON parsed but breaks the output contract.
    #[error("Response shape error: {}", describe_shape(.element, .reason))]
    ResponseShape {
        element: Option<usize>,
        reason: String,
    },

    /// Network-level failure talking to an external service.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn describe_shape(element: &Option<usize>, reason: &str) -> String {
    match element {
        Some(index) => format!("element {index}: {reason}"),
        None => reason.to_string(),
    }
}

impl AppError {
    pub(crate) fn shape(element: usize, reason: impl Into<String>) -> Self {
        AppError::ResponseShape {
            element: Some(element),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code used in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::DataShape(_) => "DATA_SHAPE_ERROR",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::UpstreamFormat(_) => "UPSTREAM_FORMAT_ERROR",
            AppError::ResponseParse(_) => "RESPONSE_PARSE_ERROR",
            AppError::ResponseShape { .. } => "RESPONSE_SHAPE_ERROR",
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Calendar(_) => "CALENDAR_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DataShape(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream { .. }
            | AppError::UpstreamFormat(_)
            | AppError::ResponseParse(_)
            | AppError::ResponseShape { .. }
            | AppError::Transport(_)
            | AppError::Calendar(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey | LlmError::ClientBuild(_) => {
                AppError::Configuration(err.to_string())
            }
            LlmError::Http(e) => AppError::Transport(format!("model request failed: {e}")),
            LlmError::Api { status, body } => AppError::Upstream { status, body },
            LlmError::Envelope(_) | LlmError::MissingText(_) => {
                AppError::UpstreamFormat(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                "The service is not configured for this operation".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                "A database error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::Upstream { status, body } => {
                tracing::error!("Model API returned {status}: {body}");
                format!("The scheduling model returned status {status}")
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_error_names_element() {
        let err = AppError::shape(3, "missing required key(s): aktivitas");
        let msg = err.to_string();
        assert!(msg.contains("element 3"));
        assert!(msg.contains("aktivitas"));
    }

    #[test]
    fn test_top_level_shape_error_has_no_element() {
        let err = AppError::ResponseShape {
            element: None,
            reason: "expected a JSON array".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Response shape error: expected a JSON array"
        );
    }

    #[test]
    fn test_llm_error_mapping() {
        let upstream: AppError = LlmError::Api {
            status: 503,
            body: "overloaded".to_string(),
        }
        .into();
        assert!(matches!(upstream, AppError::Upstream { status: 503, .. }));

        let config: AppError = LlmError::MissingApiKey.into();
        assert!(matches!(config, AppError::Configuration(_)));

        let format: AppError = LlmError::MissingText("no candidates".to_string()).into();
        assert!(matches!(format, AppError::UpstreamFormat(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DataShape("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::shape(0, "x").status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Configuration("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_uses_mapped_status() {
        let response = AppError::Validation("schedule_data is empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
