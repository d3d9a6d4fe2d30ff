use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

pub mod calendar;
pub mod config;
pub mod error;
pub mod format;
pub mod layout;
pub mod pipeline;
pub mod publish;
pub mod report;
pub mod routes;
pub mod telemetry;
pub mod timetracker;

use pipeline::ReportGenerator;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ReportGenerator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/events", post(routes::events::handle_events))
        .with_state(state)
}
