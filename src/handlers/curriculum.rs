// src/handlers/curriculum.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{error::AppError, state::AppState};

/// Lists all subjects with their topic and question counts.
pub async fn list_subjects(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let listing = state.subject_listing().await?;

    Ok(Json(listing.as_ref().clone()))
}

/// Retrieves a subject's full topic and question tree.
pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let subject = state
        .subject(&id)
        .await?
        .ok_or(AppError::NotFound("Subject not found".to_string()))?;

    Ok(Json(subject.as_ref().clone()))
}
