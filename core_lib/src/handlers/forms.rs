//! Form submission endpoints

use crate::{
    extractors::FormJson,
    models::{ContactRequest, StoryRequest, SubmissionOutcome},
    AppState,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

pub async fn handle_contact(
    State(state): State<AppState>,
    FormJson(request): FormJson<ContactRequest>,
) -> impl IntoResponse {
    info!("POST /api/contact");

    let outcome = state.submissions.submit_contact_form(&request).await;
    (outcome_status(&outcome), Json(outcome))
}

pub async fn handle_story(
    State(state): State<AppState>,
    FormJson(request): FormJson<StoryRequest>,
) -> impl IntoResponse {
    info!("POST /api/stories");

    let outcome = state.submissions.submit_story_form(&request).await;
    (outcome_status(&outcome), Json(outcome))
}

/// 422 for field errors, 502 when the effect behind the form failed.
pub fn outcome_status(outcome: &SubmissionOutcome) -> StatusCode {
    if outcome.success {
        StatusCode::OK
    } else if outcome.is_rejected() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::BAD_GATEWAY
    }
}
