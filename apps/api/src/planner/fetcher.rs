//! Data Fetcher: read-only access to a user's scheduling records.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::planner::models::{
    CourseRecord, PreferencesRecord, ScheduleRecord, SettingsRecord, UserRecords,
};

/// Source of raw user records. Absent preference/settings rows are `None`,
/// never an error.
///
/// Carried in `AppState` as `Arc<dyn ScheduleStore>`.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn fetch_user_records(&self, user_id: &str) -> Result<UserRecords, AppError>;
}

/// Postgres-backed store reading `user_courses`, `user_schedule`,
/// `user_preferences` and `user_settings`.
#[derive(Clone)]
pub struct PgScheduleStore {
    pool: PgPool,
}

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

impl PgScheduleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`. The store only reads, so a
    /// small pool is enough.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;
        info!(
            "PostgreSQL pool established (max {} connections)",
            MAX_CONNECTIONS
        );
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn fetch_user_records(&self, user_id: &str) -> Result<UserRecords, AppError> {
        let courses = sqlx::query_as::<_, CourseRecord>(
            r#"
            SELECT course_name, sks, difficulty, has_practical, related_courses,
                   evaluation_methods, reading_load, preference
            FROM user_courses
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let schedule = sqlx::query_as::<_, ScheduleRecord>(
            "SELECT day, start_time, end_time, activity FROM user_schedule WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let preferences = sqlx::query_as::<_, PreferencesRecord>(
            r#"
            SELECT preferred_study_times, sleep_time, wake_time, study_days_per_week,
                   learning_style, max_consecutive_hours
            FROM user_preferences
            WHERE user_id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let settings = sqlx::query_as::<_, SettingsRecord>(
            "SELECT sks_definition FROM user_settings WHERE user_id = $1 LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        debug!(
            "Fetched {} courses, {} schedule blocks for user {} (preferences: {}, settings: {})",
            courses.len(),
            schedule.len(),
            user_id,
            preferences.is_some(),
            settings.is_some()
        );

        Ok(UserRecords {
            user_id: user_id.to_string(),
            courses,
            schedule,
            preferences,
            settings,
        })
    }
}
