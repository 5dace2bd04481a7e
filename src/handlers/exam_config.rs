// src/handlers/exam_config.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::exam::build_exam,
    models::exam::{ConfiguredExam, ExamConfigRequest},
    state::AppState,
    utils::{html::clean_html, jwt::Claims},
};

/// Validates the payload, sanitises the title and checks the subject exists.
async fn prepare_request(
    state: &AppState,
    mut payload: ExamConfigRequest,
) -> Result<ExamConfigRequest, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    payload.title = clean_html(&payload.title);
    if payload.title.is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".to_string()));
    }

    if state.subject(&payload.subject_id).await?.is_none() {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    Ok(payload)
}

/// Lists the current user's saved exam configurations, most recent first.
pub async fn list_exam_configs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let configs = state.store.list_exam_configs(&claims.sub).await?;

    Ok(Json(configs))
}

/// Saves a new custom exam configuration.
pub async fn create_exam_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ExamConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = prepare_request(&state, payload).await?;

    let config = state.store.create_exam_config(&claims.sub, &payload).await?;
    tracing::info!("User {} saved exam config {}", claims.sub, config.id);

    Ok((StatusCode::CREATED, Json(config)))
}

/// Retrieves one saved configuration. Other users' configs read as missing.
pub async fn get_exam_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let config = state
        .store
        .fetch_exam_config(&claims.sub, id)
        .await?
        .ok_or(AppError::NotFound("Exam config not found".to_string()))?;

    Ok(Json(config))
}

/// Replaces a saved configuration.
pub async fn update_exam_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<ExamConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = prepare_request(&state, payload).await?;

    let config = state
        .store
        .update_exam_config(&claims.sub, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Exam config not found".to_string()))?;

    Ok(Json(config))
}

/// Deletes a saved configuration.
pub async fn delete_exam_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_exam_config(&claims.sub, id).await? {
        return Err(AppError::NotFound("Exam config not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Generates an exam from a saved configuration.
/// The response carries the config's title, timer and target marks.
pub async fn generate_from_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let config = state
        .store
        .fetch_exam_config(&claims.sub, id)
        .await?
        .ok_or(AppError::NotFound("Exam config not found".to_string()))?;

    let exam = build_exam(&state, &config.exam_config()).await?;

    Ok(Json(ConfiguredExam {
        config_id: config.id,
        title: config.title,
        timer_minutes: config.timer_minutes,
        target_marks: config.target_marks,
        exam,
    }))
}
