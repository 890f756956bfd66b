//! Response Validator: the only gate between model text and a typed schedule.
//!
//! Pipeline: strip code fences → parse JSON → require a top-level array →
//! require every element to be an object carrying all five keys as strings.
//! The first violation aborts the whole parse; nothing is repaired or coerced.
//!
//! `ValidationMode::Strict` layers value checks (dates, times, ordering,
//! unknown keys) on top of the presence checks.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::planner::models::StudySession;

/// Keys every session object must carry, exactly as spelled.
pub const REQUIRED_KEYS: [&str; 5] = [
    "tanggal",
    "waktu_mulai",
    "waktu_berakhir",
    "mata_kuliah",
    "aktivitas",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Keys must be present with string values; values are opaque.
    #[default]
    Presence,
    /// Presence, plus non-empty values, `YYYY-MM-DD` dates, `HH:MM` times,
    /// start before end, and no keys outside `REQUIRED_KEYS`.
    Strict,
}

/// Parses model text into study sessions, preserving the order received.
pub fn parse_schedule(text: &str, mode: ValidationMode) -> Result<Vec<StudySession>, AppError> {
    let cleaned = strip_code_fences(text);
    if cleaned.len() != text.trim().len() {
        debug!("Stripped code fences from model output");
    }

    let document: Value = serde_json::from_str(cleaned).map_err(AppError::ResponseParse)?;

    let items = match document {
        Value::Array(items) => items,
        other => {
            return Err(AppError::ResponseShape {
                element: None,
                reason: format!("expected a JSON array, found {}", kind(&other)),
            })
        }
    };

    let sessions = items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_element(index, item, mode))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Validated {} study sessions ({:?} mode)",
        sessions.len(),
        mode
    );
    Ok(sessions)
}

fn validate_element(
    index: usize,
    item: &Value,
    mode: ValidationMode,
) -> Result<StudySession, AppError> {
    let fields = item.as_object().ok_or_else(|| {
        AppError::shape(index, format!("expected an object, found {}", kind(item)))
    })?;

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !fields.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::shape(
            index,
            format!("missing required key(s): {}", missing.join(", ")),
        ));
    }

    let session = StudySession {
        date: string_field(index, fields, "tanggal")?,
        start_time: string_field(index, fields, "waktu_mulai")?,
        end_time: string_field(index, fields, "waktu_berakhir")?,
        course_name: string_field(index, fields, "mata_kuliah")?,
        activity: string_field(index, fields, "aktivitas")?,
    };

    if mode == ValidationMode::Strict {
        if let Some(extra) = fields.keys().find(|k| !REQUIRED_KEYS.contains(&k.as_str())) {
            return Err(AppError::shape(index, format!("unexpected key '{extra}'")));
        }
        check_values(&session).map_err(|reason| AppError::shape(index, reason))?;
    }

    Ok(session)
}

fn string_field(index: usize, fields: &Map<String, Value>, key: &str) -> Result<String, AppError> {
    match fields.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(AppError::shape(
            index,
            format!("key '{key}' must be a string, found {}", kind(other)),
        )),
        None => Err(AppError::shape(
            index,
            format!("missing required key(s): {key}"),
        )),
    }
}

/// Value-level checks for a session: every field non-empty, a real calendar
/// date, `HH:MM` bounds, and start strictly before end.
pub fn check_values(session: &StudySession) -> Result<(), String> {
    for (key, value) in [
        ("tanggal", &session.date),
        ("waktu_mulai", &session.start_time),
        ("waktu_berakhir", &session.end_time),
        ("mata_kuliah", &session.course_name),
        ("aktivitas", &session.activity),
    ] {
        if value.trim().is_empty() {
            return Err(format!("key '{key}' is empty"));
        }
    }

    NaiveDate::parse_from_str(&session.date, "%Y-%m-%d")
        .map_err(|_| format!("tanggal '{}' is not a YYYY-MM-DD date", session.date))?;

    let start = strict_clock("waktu_mulai", &session.start_time)?;
    let end = strict_clock("waktu_berakhir", &session.end_time)?;
    if start >= end {
        return Err(format!(
            "waktu_mulai {} is not before waktu_berakhir {}",
            session.start_time, session.end_time
        ));
    }
    Ok(())
}

fn strict_clock(key: &str, value: &str) -> Result<chrono::NaiveTime, String> {
    // chrono accepts single-digit hours; the contract is exactly HH:MM.
    if value.len() != 5 {
        return Err(format!("{key} '{value}' is not an HH:MM time"));
    }
    chrono::NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| format!("{key} '{value}' is not an HH:MM time"))
}

/// Strips a surrounding Markdown code fence (with optional language tag).
/// Text without a leading fence is returned trimmed and otherwise untouched.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // The tag may run straight into the payload: "```json[...]```".
    let tag_len = rest.find(|c: char| !is_tag_char(c)).unwrap_or(rest.len());
    let (tag, after) = rest.split_at(tag_len);
    let payload_follows = after.is_empty()
        || after.starts_with(|c: char| c.is_whitespace() || c == '[' || c == '{');
    let body = if !tag.is_empty() && payload_follows {
        after
    } else {
        rest
    };

    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
