use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ────────────────────────────────────────────────────────────────────────────
// Raw store records
// ────────────────────────────────────────────────────────────────────────────
//
// Every column is nullable here. The normalizer decides whether an absent
// value becomes a default or a data shape error.

/// One row of `user_courses`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CourseRecord {
    pub course_name: Option<String>,
    pub sks: Option<i32>,
    pub difficulty: Option<i32>,
    pub has_practical: Option<bool>,
    pub reading_load: Option<i32>,
    pub preference: Option<i32>,
    pub related_courses: Option<Vec<String>>,
    pub evaluation_methods: Option<Vec<String>>,
}

/// One row of `user_schedule`: an existing fixed commitment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ScheduleRecord {
    pub day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub activity: Option<String>,
}

/// The single `user_preferences` row, if the user saved one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PreferencesRecord {
    pub preferred_study_times: Option<Vec<String>>,
    pub sleep_time: Option<String>,
    pub wake_time: Option<String>,
    pub study_days_per_week: Option<i32>,
    pub learning_style: Option<String>,
    pub max_consecutive_hours: Option<i32>,
}

/// The single `user_settings` row, if the user saved one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SettingsRecord {
    /// Minutes of study per credit unit (SKS).
    pub sks_definition: Option<i32>,
}

/// Everything the fetcher returns for one user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRecords {
    pub user_id: String,
    pub courses: Vec<CourseRecord>,
    pub schedule: Vec<ScheduleRecord>,
    pub preferences: Option<PreferencesRecord>,
    pub settings: Option<SettingsRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical request (prompt input)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    /// Credit load in SKS units.
    pub sks: u32,
    /// 1 to 5
    pub difficulty: u8,
    pub has_practical: bool,
    /// 1 to 5
    pub reading_load: u8,
    /// User interest in the course, 1 to 5.
    pub preference: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_courses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_methods: Option<Vec<String>>,
}

/// An existing commitment the study plan must not overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub activity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSchedule {
    pub sleep_time: String,
    pub wake_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPreferences {
    pub preferred_study_times: Vec<String>,
    pub sleep_schedule: SleepSchedule,
    /// 5 or 7
    pub study_days_per_week: u8,
    pub learning_style: String,
    pub max_consecutive_hours: u32,
}

/// Minutes of study per credit unit. Serialized as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditUnitDefinition {
    pub minutes_per_unit: u32,
}

/// Fully defaulted scheduling input. Built per invocation, consumed by the
/// prompt builder, then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRequest {
    pub user_id: String,
    pub courses: Vec<Course>,
    pub existing_schedule: Vec<ScheduleBlock>,
    pub study_preferences: StudyPreferences,
    pub sks_definition: CreditUnitDefinition,
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// One scheduled study block. Wire keys are the external schedule format
/// consumed by downstream tooling and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    /// YYYY-MM-DD
    #[serde(rename = "tanggal")]
    pub date: String,
    /// HH:MM
    #[serde(rename = "waktu_mulai")]
    pub start_time: String,
    /// HH:MM
    #[serde(rename = "waktu_berakhir")]
    pub end_time: String,
    #[serde(rename = "mata_kuliah")]
    pub course_name: String,
    #[serde(rename = "aktivitas")]
    pub activity: String,
}

/// Parses a wall-clock time as `HH:MM`, or `HH:MM:SS` as stored by some rows.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}
