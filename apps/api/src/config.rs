use anyhow::{bail, Context, Result};

use crate::calendar::FailurePolicy;
use crate::planner::validator::ValidationMode;

const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_CALENDAR_TIMEZONE: &str = "Asia/Jakarta";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_timeout_secs: u64,
    /// Optional: only needed when publishing to Google Calendar.
    pub google_calendar_access_token: Option<String>,
    pub calendar_timezone: String,
    pub calendar_failure_policy: FailurePolicy,
    pub validation_mode: ValidationMode,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            llm_timeout_secs: env_or("LLM_TIMEOUT_SECS", "120")
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            google_calendar_access_token: optional_env("GOOGLE_CALENDAR_ACCESS_TOKEN"),
            calendar_timezone: env_or("CALENDAR_TIMEZONE", DEFAULT_CALENDAR_TIMEZONE),
            calendar_failure_policy: parse_failure_policy(&env_or(
                "CALENDAR_FAILURE_POLICY",
                "all_or_nothing",
            ))?,
            validation_mode: parse_validation_mode(&env_or("SCHEDULE_VALIDATION", "presence"))?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_failure_policy(raw: &str) -> Result<FailurePolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "all_or_nothing" => Ok(FailurePolicy::AllOrNothing),
        "per_item" => Ok(FailurePolicy::PerItem),
        other => bail!("CALENDAR_FAILURE_POLICY must be 'all_or_nothing' or 'per_item', got '{other}'"),
    }
}

fn parse_validation_mode(raw: &str) -> Result<ValidationMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "presence" => Ok(ValidationMode::Presence),
        "strict" => Ok(ValidationMode::Strict),
        other => bail!("SCHEDULE_VALIDATION must be 'presence' or 'strict', got '{other}'"),
    }
}
