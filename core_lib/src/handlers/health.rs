//! Health and fallback handlers

use crate::{error::{AppError, Result}, AppState};
use axum::{extract::State, http::Uri, response::IntoResponse, Json};
use tracing::warn;

pub async fn handle_health(State(state): State<AppState>) -> Result<impl IntoResponse> {
    if let Some(database) = &state.database {
        if let Err(e) = database.health_check().await {
            warn!("Health check failed: {}", e);
            return Err(AppError::ServiceUnavailable("database unavailable".to_string()));
        }
    }

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "app": state.app_name,
        "version": state.version,
        "timestamp": chrono::Utc::now().timestamp(),
        "storage": {
            "contact": state.submissions.notifier_name(),
            "stories": state.submissions.storage_name(),
        },
    })))
}

pub async fn handle_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
