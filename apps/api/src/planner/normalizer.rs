//! Normalizer: turns raw store records into a fully defaulted `CanonicalRequest`.
//!
//! Pure and idempotent: the same `UserRecords` always yield the same request.
//! Required course/schedule fields that are absent fail with `DataShape`;
//! absent preferences and settings fall back to `PLANNER_DEFAULTS`.

use crate::errors::AppError;
use crate::planner::defaults::{PLANNER_DEFAULTS, RATING_MAX, RATING_MIN, STUDY_DAYS_OPTIONS};
use crate::planner::models::{
    parse_clock, CanonicalRequest, Course, CourseRecord, CreditUnitDefinition, PreferencesRecord,
    ScheduleBlock, ScheduleRecord, SettingsRecord, SleepSchedule, StudyPreferences, UserRecords,
};

pub fn normalize(records: &UserRecords) -> Result<CanonicalRequest, AppError> {
    if records.user_id.trim().is_empty() {
        return Err(AppError::DataShape("user_id is empty".to_string()));
    }

    let courses = records
        .courses
        .iter()
        .enumerate()
        .map(|(index, course)| normalize_course(index, course))
        .collect::<Result<Vec<_>, _>>()?;

    let existing_schedule = records
        .schedule
        .iter()
        .enumerate()
        .map(|(index, block)| normalize_block(index, block))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CanonicalRequest {
        user_id: records.user_id.clone(),
        courses,
        existing_schedule,
        study_preferences: normalize_preferences(records.preferences.as_ref())?,
        sks_definition: normalize_settings(records.settings.as_ref())?,
    })
}

fn normalize_course(index: usize, record: &CourseRecord) -> Result<Course, AppError> {
    let name = non_blank(&record.course_name)
        .ok_or_else(|| missing(&format!("course[{index}]"), "course_name"))?;
    let label = format!("course[{index}] ('{name}')");

    let sks = record.sks.ok_or_else(|| missing(&label, "sks"))?;
    if sks <= 0 {
        return Err(AppError::DataShape(format!(
            "{label} has non-positive sks {sks}"
        )));
    }

    Ok(Course {
        sks: sks as u32,
        difficulty: rating(&label, "difficulty", record.difficulty)?,
        has_practical: record
            .has_practical
            .ok_or_else(|| missing(&label, "has_practical"))?,
        reading_load: rating(&label, "reading_load", record.reading_load)?,
        preference: rating(&label, "preference", record.preference)?,
        related_courses: non_empty_list(&record.related_courses),
        evaluation_methods: non_empty_list(&record.evaluation_methods),
        name,
    })
}

fn normalize_block(index: usize, record: &ScheduleRecord) -> Result<ScheduleBlock, AppError> {
    let label = format!("schedule[{index}]");
    let day = non_blank(&record.day).ok_or_else(|| missing(&label, "day"))?;
    let start_time = non_blank(&record.start_time).ok_or_else(|| missing(&label, "start_time"))?;
    let end_time = non_blank(&record.end_time).ok_or_else(|| missing(&label, "end_time"))?;
    let activity = non_blank(&record.activity).ok_or_else(|| missing(&label, "activity"))?;

    let start = clock(&label, "start_time", &start_time)?;
    let end = clock(&label, "end_time", &end_time)?;
    if start >= end {
        return Err(AppError::DataShape(format!(
            "{label} ('{activity}' on {day}) starts at {start_time}, not before its end {end_time}"
        )));
    }

    Ok(ScheduleBlock {
        day,
        start_time,
        end_time,
        activity,
    })
}

fn normalize_preferences(
    record: Option<&PreferencesRecord>,
) -> Result<StudyPreferences, AppError> {
    let defaults = PLANNER_DEFAULTS;
    let empty = PreferencesRecord::default();
    let prefs = record.unwrap_or(&empty);

    let sleep_time =
        non_blank(&prefs.sleep_time).unwrap_or_else(|| defaults.sleep_time.to_string());
    let wake_time = non_blank(&prefs.wake_time).unwrap_or_else(|| defaults.wake_time.to_string());
    clock("preferences", "sleep_time", &sleep_time)?;
    clock("preferences", "wake_time", &wake_time)?;

    let study_days_per_week = match prefs.study_days_per_week {
        None => defaults.study_days_per_week,
        Some(days) => STUDY_DAYS_OPTIONS
            .iter()
            .copied()
            .find(|option| i32::from(*option) == days)
            .ok_or_else(|| {
                AppError::DataShape(format!(
                    "preferences.study_days_per_week must be one of {STUDY_DAYS_OPTIONS:?}, got {days}"
                ))
            })?,
    };

    let max_consecutive_hours = match prefs.max_consecutive_hours {
        None => defaults.max_consecutive_hours,
        Some(hours) if hours > 0 => hours as u32,
        Some(hours) => {
            return Err(AppError::DataShape(format!(
                "preferences.max_consecutive_hours must be positive, got {hours}"
            )))
        }
    };

    let preferred_study_times = prefs
        .preferred_study_times
        .iter()
        .flatten()
        .map(|window| window.trim())
        .filter(|window| !window.is_empty())
        .map(str::to_string)
        .collect();

    Ok(StudyPreferences {
        preferred_study_times,
        sleep_schedule: SleepSchedule {
            sleep_time,
            wake_time,
        },
        study_days_per_week,
        learning_style: non_blank(&prefs.learning_style)
            .unwrap_or_else(|| defaults.learning_style.to_string()),
        max_consecutive_hours,
    })
}

fn normalize_settings(record: Option<&SettingsRecord>) -> Result<CreditUnitDefinition, AppError> {
    let minutes_per_unit = match record.and_then(|s| s.sks_definition) {
        None => PLANNER_DEFAULTS.sks_definition,
        Some(minutes) if minutes > 0 => minutes as u32,
        Some(minutes) => {
            return Err(AppError::DataShape(format!(
                "settings.sks_definition must be positive, got {minutes}"
            )))
        }
    };
    Ok(CreditUnitDefinition { minutes_per_unit })
}

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

fn missing(label: &str, field: &str) -> AppError {
    AppError::DataShape(format!("{label} is missing required field '{field}'"))
}

/// Trimmed value, or `None` when absent or whitespace-only.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn non_empty_list(value: &Option<Vec<String>>) -> Option<Vec<String>> {
    value.as_ref().filter(|list| !list.is_empty()).cloned()
}

fn rating(label: &str, field: &str, value: Option<i32>) -> Result<u8, AppError> {
    let value = value.ok_or_else(|| missing(label, field))?;
    if !(RATING_MIN..=RATING_MAX).contains(&value) {
        return Err(AppError::DataShape(format!(
            "{label} field '{field}' must be between {RATING_MIN} and {RATING_MAX}, got {value}"
        )));
    }
    Ok(value as u8)
}

fn clock(label: &str, field: &str, value: &str) -> Result<chrono::NaiveTime, AppError> {
    parse_clock(value).ok_or_else(|| {
        AppError::DataShape(format!(
            "{label} field '{field}' is not a valid HH:MM time: '{value}'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(name: &str) -> CourseRecord {
        CourseRecord {
            course_name: Some(name.to_string()),
            sks: Some(3),
            difficulty: Some(4),
            has_practical: Some(false),
            reading_load: Some(2),
            preference: Some(5),
            related_courses: None,
            evaluation_methods: None,
        }
    }

    fn records() -> UserRecords {
        UserRecords {
            user_id: "user-42".to_string(),
            courses: vec![course("Algorithms")],
            schedule: vec![ScheduleRecord {
                day: Some("Monday".to_string()),
                start_time: Some("08:00".to_string()),
                end_time: Some("10:00".to_string()),
                activity: Some("Calculus lecture".to_string()),
            }],
            preferences: None,
            settings: None,
        }
    }

    fn assert_data_shape(result: Result<CanonicalRequest, AppError>, needle: &str) {
        match result {
            Err(AppError::DataShape(msg)) => {
                assert!(msg.contains(needle), "message {msg:?} should mention {needle:?}")
            }
            other => panic!("expected DataShape error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_preferences_and_settings_use_defaults() {
        let request = normalize(&records()).unwrap();
        let prefs = &request.study_preferences;
        assert_eq!(prefs.sleep_schedule.sleep_time, "23:00");
        assert_eq!(prefs.sleep_schedule.wake_time, "07:00");
        assert_eq!(prefs.study_days_per_week, 5);
        assert_eq!(prefs.learning_style, "visual");
        assert_eq!(prefs.max_consecutive_hours, 2);
        assert!(prefs.preferred_study_times.is_empty());
        assert_eq!(request.sks_definition.minutes_per_unit, 50);
    }

    #[test]
    fn test_partial_preferences_fill_remaining_defaults() {
        let mut input = records();
        input.preferences = Some(PreferencesRecord {
            preferred_study_times: Some(vec!["19:00-21:00".to_string(), "  ".to_string()]),
            sleep_time: Some("22:30".to_string()),
            study_days_per_week: Some(7),
            ..Default::default()
        });
        input.settings = Some(SettingsRecord { sks_definition: None });

        let prefs = normalize(&input).unwrap().study_preferences;
        assert_eq!(prefs.preferred_study_times, vec!["19:00-21:00"]);
        assert_eq!(prefs.sleep_schedule.sleep_time, "22:30");
        assert_eq!(prefs.sleep_schedule.wake_time, "07:00");
        assert_eq!(prefs.study_days_per_week, 7);
        assert_eq!(prefs.learning_style, "visual");
    }

    #[test]
    fn test_blank_learning_style_counts_as_absent() {
        let mut input = records();
        input.preferences = Some(PreferencesRecord {
            learning_style: Some("   ".to_string()),
            ..Default::default()
        });
        assert_eq!(
            normalize(&input).unwrap().study_preferences.learning_style,
            "visual"
        );
    }

    #[test]
    fn test_custom_sks_definition_is_kept() {
        let mut input = records();
        input.settings = Some(SettingsRecord {
            sks_definition: Some(170),
        });
        assert_eq!(
            normalize(&input).unwrap().sks_definition.minutes_per_unit,
            170
        );
    }

    #[test]
    fn test_each_missing_required_course_field_is_rejected() {
        let cases: [(&str, fn(&mut CourseRecord)); 6] = [
            ("course_name", |c| c.course_name = None),
            ("sks", |c| c.sks = None),
            ("difficulty", |c| c.difficulty = None),
            ("has_practical", |c| c.has_practical = None),
            ("reading_load", |c| c.reading_load = None),
            ("preference", |c| c.preference = None),
        ];
        for (field, strip) in cases {
            let mut input = records();
            strip(&mut input.courses[0]);
            assert_data_shape(normalize(&input), field);
        }
    }

    #[test]
    fn test_error_names_offending_course_index() {
        let mut input = records();
        let mut broken = course("Physics");
        broken.difficulty = None;
        input.courses.push(broken);
        assert_data_shape(normalize(&input), "course[1] ('Physics')");
    }

    #[test]
    fn test_blank_course_name_is_missing() {
        let mut input = records();
        input.courses[0].course_name = Some("  ".to_string());
        assert_data_shape(normalize(&input), "course_name");
    }

    #[test]
    fn test_out_of_range_rating_is_rejected() {
        let mut input = records();
        input.courses[0].reading_load = Some(6);
        assert_data_shape(normalize(&input), "reading_load");

        let mut input = records();
        input.courses[0].preference = Some(0);
        assert_data_shape(normalize(&input), "preference");
    }

    #[test]
    fn test_non_positive_sks_is_rejected() {
        let mut input = records();
        input.courses[0].sks = Some(0);
        assert_data_shape(normalize(&input), "sks");
    }

    #[test]
    fn test_optional_lists_only_kept_when_non_empty() {
        let mut input = records();
        input.courses[0].related_courses = Some(vec![]);
        input.courses[0].evaluation_methods = Some(vec!["midterm".to_string(), "quiz".to_string()]);

        let request = normalize(&input).unwrap();
        let course = &request.courses[0];
        assert!(course.related_courses.is_none());
        assert_eq!(
            course.evaluation_methods.as_deref(),
            Some(&["midterm".to_string(), "quiz".to_string()][..])
        );

        let json = serde_json::to_value(&request).unwrap();
        assert!(json["courses"][0].get("related_courses").is_none());
    }

    #[test]
    fn test_schedule_block_must_start_before_end() {
        let mut input = records();
        input.schedule[0].end_time = Some("08:00".to_string());
        assert_data_shape(normalize(&input), "not before its end");
    }

    #[test]
    fn test_schedule_block_missing_activity_is_rejected() {
        let mut input = records();
        input.schedule[0].activity = None;
        assert_data_shape(normalize(&input), "activity");
    }

    #[test]
    fn test_invalid_study_days_is_rejected() {
        let mut input = records();
        input.preferences = Some(PreferencesRecord {
            study_days_per_week: Some(6),
            ..Default::default()
        });
        assert_data_shape(normalize(&input), "study_days_per_week");
    }

    #[test]
    fn test_invalid_sleep_time_is_rejected() {
        let mut input = records();
        input.preferences = Some(PreferencesRecord {
            sleep_time: Some("late".to_string()),
            ..Default::default()
        });
        assert_data_shape(normalize(&input), "sleep_time");
    }

    #[test]
    fn test_non_positive_sks_definition_is_rejected() {
        let mut input = records();
        input.settings = Some(SettingsRecord {
            sks_definition: Some(-10),
        });
        assert_data_shape(normalize(&input), "sks_definition");
    }

    #[test]
    fn test_empty_course_list_is_valid() {
        let mut input = records();
        input.courses.clear();
        input.schedule.clear();
        let request = normalize(&input).unwrap();
        assert!(request.courses.is_empty());
        assert!(request.existing_schedule.is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut input = records();
        input.courses.push(CourseRecord {
            related_courses: Some(vec!["Algorithms".to_string()]),
            ..course("Data Structures")
        });
        let first = normalize(&input).unwrap();
        let second = normalize(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
