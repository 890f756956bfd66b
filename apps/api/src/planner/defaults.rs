//! Defaults applied by the normalizer when a user has not set a value.
//!
//! This is the only place fallback values live. The normalizer reads
//! `PLANNER_DEFAULTS`; nothing else substitutes values inline.

/// Field → default table for scheduling inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerDefaults {
    /// Minutes per SKS credit unit.
    pub sks_definition: u32,
    pub sleep_time: &'static str,
    pub wake_time: &'static str,
    pub study_days_per_week: u8,
    pub learning_style: &'static str,
    pub max_consecutive_hours: u32,
}

pub const PLANNER_DEFAULTS: PlannerDefaults = PlannerDefaults {
    sks_definition: 50,
    sleep_time: "23:00",
    wake_time: "07:00",
    study_days_per_week: 5,
    learning_style: "visual",
    max_consecutive_hours: 2,
};

/// Accepted values for `study_days_per_week`.
pub const STUDY_DAYS_OPTIONS: [u8; 2] = [5, 7];

/// Inclusive bounds for difficulty, reading load and preference ratings.
pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_study_days_is_an_accepted_option() {
        assert!(STUDY_DAYS_OPTIONS.contains(&PLANNER_DEFAULTS.study_days_per_week));
    }

    #[test]
    fn test_default_sleep_window_parses() {
        use crate::planner::models::parse_clock;
        assert!(parse_clock(PLANNER_DEFAULTS.sleep_time).is_some());
        assert!(parse_clock(PLANNER_DEFAULTS.wake_time).is_some());
    }
}
