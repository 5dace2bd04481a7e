// src/handlers/exam.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    config::LEADERBOARD_SIZE,
    error::{AppError, ExamError},
    models::{
        exam::{ExamConfig, GeneratedExam, SubmitExamRequest},
        exam_record::NewExamRecord,
    },
    services::{exam_generator, scoring::score_attempt},
    state::AppState,
    utils::jwt::Claims,
};

/// Resolves the subject and runs the question selector for `config`.
pub(crate) async fn build_exam(
    state: &AppState,
    config: &ExamConfig,
) -> Result<GeneratedExam, AppError> {
    let subject = state
        .subject(&config.subject_id)
        .await?
        .ok_or_else(|| ExamError::SubjectNotFound(config.subject_id.clone()))?;

    let questions = exam_generator::generate_exam(&subject, config, &mut rand::thread_rng())
        .inspect_err(|e| tracing::info!("Exam generation refused for {}: {}", subject.id, e))?;

    Ok(GeneratedExam::new(
        subject.id.clone(),
        config.difficulty,
        questions,
    ))
}

/// Generates a custom practice exam from an ad-hoc configuration.
///
/// * Topics not belonging to the subject are ignored.
/// * Fails with 422 when the filters leave fewer than 5 questions.
pub async fn generate_exam(
    State(state): State<AppState>,
    Json(config): Json<ExamConfig>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = config.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let exam = build_exam(&state, &config).await?;

    Ok(Json(exam))
}

/// Records a self-marked exam attempt.
///
/// * Clamps awarded marks to each question's allocation.
/// * Target marks come from the saved config when `config_id` is given; the
///   config must be for the submitted subject.
/// * Marks awarded count as leaderboard points.
pub async fn submit_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.awarded.is_empty() {
        return Err(AppError::BadRequest("No answers submitted".to_string()));
    }

    let subject = state
        .subject(&req.subject_id)
        .await?
        .ok_or(AppError::NotFound("Subject not found".to_string()))?;

    let target_marks = match req.config_id {
        Some(config_id) => {
            let config = state
                .store
                .fetch_exam_config(&claims.sub, config_id)
                .await?
                .ok_or(AppError::NotFound("Exam config not found".to_string()))?;
            if config.subject_id != subject.id {
                return Err(AppError::BadRequest(format!(
                    "Exam config {} is for subject '{}', not '{}'",
                    config_id, config.subject_id, subject.id
                )));
            }
            Some(config.target_marks)
        }
        None => req.target_marks,
    };

    let score = score_attempt(&subject, &req.awarded, target_marks).ok_or(
        AppError::BadRequest("None of the submitted questions belong to this subject".to_string()),
    )?;

    let record = state
        .store
        .record_exam(
            &claims.sub,
            &NewExamRecord {
                subject_id: subject.id.clone(),
                config_id: req.config_id,
                marks_awarded: score.marks_awarded,
                marks_available: score.marks_available,
                question_count: score.question_count as i32,
                percentage: score.percentage,
                target_met: score.target_met,
            },
        )
        .await?;

    tracing::info!(
        "User {} scored {}/{} on {}",
        claims.sub,
        score.marks_awarded,
        score.marks_available,
        subject.id
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": record.id,
            "marks_awarded": score.marks_awarded,
            "marks_available": score.marks_available,
            "question_count": score.question_count,
            "percentage": score.percentage,
            "target_marks": score.target_marks,
            "target_met": score.target_met,
            "points_earned": score.marks_awarded,
        })),
    ))
}

/// Retrieves the top point earners.
pub async fn get_leaderboard(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let leaderboard = state.store.leaderboard(LEADERBOARD_SIZE).await?;

    Ok(Json(leaderboard))
}
