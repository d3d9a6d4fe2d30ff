use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::QueueEvent;

/// Accepts a queue event batch and runs every message through the report pipeline.
pub async fn handle_events(
    State(state): State<AppState>,
    body: String,
) -> AppResult<Json<Value>> {
    let event: QueueEvent = serde_json::from_str(&body)
        .map_err(|e| AppError::Validation(format!("invalid queue event: {e}")))?;

    let outcomes = state.generator.handle_events(&event).await?;

    Ok(Json(json!({
        "processed": outcomes.len(),
        "reports": outcomes,
    })))
}
