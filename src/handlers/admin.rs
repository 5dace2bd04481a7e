// src/handlers/admin.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

/// DTO for cache invalidation. Without a subject (or without a body at all)
/// the whole cache is dropped.
#[derive(Debug, Deserialize)]
pub struct InvalidateCacheRequest {
    pub subject_id: Option<String>,
}

/// Drops cached curriculum so the next read goes to the database.
/// Admin only.
pub async fn invalidate_cache(
    State(state): State<AppState>,
    payload: Option<Json<InvalidateCacheRequest>>,
) -> Result<impl IntoResponse, AppError> {
    match payload.and_then(|Json(req)| req.subject_id) {
        Some(subject_id) => {
            tracing::info!("Invalidating cached subject {}", subject_id);
            state.cache.invalidate_subject(&subject_id);
        }
        None => {
            tracing::info!("Invalidating curriculum cache");
            state.cache.invalidate_all();
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
