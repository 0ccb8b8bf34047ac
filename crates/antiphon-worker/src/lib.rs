//! Antiphon worker library logic.
//!
//! Exposes the dispatch HTTP API and the job manager that runs voice
//! assistant sessions against LiveKit rooms.

pub mod api;
pub mod config;
pub mod jobs;

use antiphon_agent::{OpenAiRealtime, RoomService, VoiceAssistant, WeatherTool};
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use config::Config;
use jobs::JobManager;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Assistant runner shared by every job.
    pub assistant: Arc<VoiceAssistant>,
    /// Tracker for dispatched jobs.
    pub jobs: JobManager,
}

impl AppState {
    /// Wires up production services from the loaded configuration.
    pub fn from_config(config: &Config, openai_api_key: String) -> Self {
        let rooms = RoomService::new(config.livekit.clone());
        let provider = OpenAiRealtime::new(openai_api_key, config.realtime.clone());
        let weather = WeatherTool::new(&config.weather);

        let assistant = VoiceAssistant::new(Arc::new(rooms), Arc::new(provider), weather);

        Self {
            assistant: Arc::new(assistant),
            jobs: JobManager::new(),
        }
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/jobs",
            post(api::dispatch_handler).get(api::list_jobs_handler),
        )
        .route(
            "/jobs/{id}",
            get(api::get_job_handler).delete(api::cancel_job_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
