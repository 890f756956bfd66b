mod calendar;
mod config;
mod errors;
mod llm_client;
mod planner;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::calendar::google::GoogleCalendarClient;
use crate::calendar::CalendarPublisher;
use crate::config::Config;
use crate::llm_client::{GeminiClient, TextGenerator};
use crate::planner::fetcher::PgScheduleStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Study Planner API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let store = Arc::new(PgScheduleStore::connect(&config.database_url).await?);

    // Initialize model client
    let timeout = Duration::from_secs(config.llm_timeout_secs);
    let llm = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
        timeout,
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    // Calendar publishing is optional
    let calendar = match &config.google_calendar_access_token {
        Some(token) => {
            let api = GoogleCalendarClient::new(token.clone(), timeout)?;
            info!(
                "Calendar publisher initialized (time zone: {}, policy: {:?})",
                config.calendar_timezone, config.calendar_failure_policy
            );
            Some(Arc::new(CalendarPublisher::new(
                Arc::new(api),
                config.calendar_timezone.clone(),
                config.calendar_failure_policy,
            )))
        }
        None => {
            warn!("GOOGLE_CALENDAR_ACCESS_TOKEN not set, calendar publishing disabled");
            None
        }
    };

    // Build app state
    let state = AppState {
        store,
        llm: Arc::new(llm),
        calendar,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
