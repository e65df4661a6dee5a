//! Axum route handlers for the Ideas API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::ideas::service::{self, CopyResult, IdeasView};
use crate::models::idea::{FeedbackReason, IdeaWithFeedback, Rating};
use crate::models::profile::UserProfile;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateIdeasRequest {
    pub profile: UserProfile,
    pub num_ideas: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: Option<Rating>,
    #[serde(default)]
    pub reason: Option<FeedbackReason>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub updated: bool,
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub idea: IdeaWithFeedback,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ideas/generate
///
/// Validates the profile, calls the generator and replaces the idea list.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateIdeasRequest>,
) -> Result<Json<IdeasView>, AppError> {
    let view = service::generate_ideas(&state, request.profile, request.num_ideas).await?;
    Ok(Json(view))
}

/// GET /api/v1/ideas
pub async fn handle_list_ideas(State(state): State<AppState>) -> Json<IdeasView> {
    Json(service::current_view(&state).await)
}

/// PUT /api/v1/ideas/:id/feedback
///
/// Unknown ids are not an error: the response reports `updated: false`.
pub async fn handle_set_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<FeedbackRequest>,
) -> Json<FeedbackResponse> {
    let updated = service::set_feedback(&state, &id, request.rating, request.reason).await;
    Json(FeedbackResponse { updated })
}

/// POST /api/v1/ideas/:id/regenerate
pub async fn handle_regenerate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RegenerateResponse>, AppError> {
    let idea = service::regenerate_idea(&state, &id).await?;
    Ok(Json(RegenerateResponse { idea }))
}

/// POST /api/v1/ideas/:id/copy
pub async fn handle_copy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CopyResult>, AppError> {
    Ok(Json(service::copy_idea(&state, &id).await?))
}

/// GET /api/v1/profile
///
/// Returns the profile the current ideas were generated from.
pub async fn handle_get_profile(
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AppError> {
    service::current_profile(&state)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No profile has been submitted yet".to_string()))
}
