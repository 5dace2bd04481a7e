// src/store/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};

use crate::{
    error::AppError,
    models::{
        curriculum::{Difficulty, MarkingPoint, Question, Subject, SubjectSummary, Topic},
        exam::{CustomExamConfig, DifficultyFilter, ExamConfigRequest},
        exam_record::{ExamRecord, LeaderboardEntry, NewExamRecord},
    },
    store::Store,
};

/// Store backed by the hosted Postgres database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Helper struct for the 'topics' table.
#[derive(FromRow)]
struct TopicRow {
    id: String,
    name: String,
}

/// Helper struct for the 'questions' table.
#[derive(FromRow)]
struct QuestionRow {
    id: String,
    topic_id: String,
    question_text: String,
    marks: i32,
    difficulty: String,
    model_answer: String,
    /// Stored as a JSON array in the database.
    marking_criteria: Json<Vec<MarkingPoint>>,
    spec_reference: Option<String>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Question {
            difficulty: row
                .difficulty
                .parse::<Difficulty>()
                .map_err(AppError::InternalServerError)?,
            id: row.id,
            question_text: row.question_text,
            marks: row.marks,
            model_answer: row.model_answer,
            marking_criteria: row.marking_criteria.0,
            spec_reference: row.spec_reference,
        })
    }
}

/// Helper struct for the 'custom_exam_configs' table.
#[derive(FromRow)]
struct ExamConfigRow {
    id: i64,
    user_id: String,
    title: String,
    subject_id: String,
    topic_ids: Vec<String>,
    timer_minutes: i32,
    difficulty: String,
    target_marks: i32,
    question_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ExamConfigRow> for CustomExamConfig {
    type Error = AppError;

    fn try_from(row: ExamConfigRow) -> Result<Self, Self::Error> {
        Ok(CustomExamConfig {
            difficulty: row
                .difficulty
                .parse::<DifficultyFilter>()
                .map_err(AppError::InternalServerError)?,
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            subject_id: row.subject_id,
            topic_ids: row.topic_ids,
            timer_minutes: row.timer_minutes,
            target_marks: row.target_marks,
            question_count: row.question_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const EXAM_CONFIG_COLUMNS: &str = "id, user_id, title, subject_id, topic_ids, timer_minutes, \
     difficulty, target_marks, question_count, created_at, updated_at";

#[async_trait]
impl Store for PgStore {
    async fn list_subjects(&self) -> Result<Vec<SubjectSummary>, AppError> {
        let subjects = sqlx::query_as::<_, SubjectSummary>(
            r#"
            SELECT
                s.id,
                s.name,
                (SELECT COUNT(*) FROM topics t WHERE t.subject_id = s.id) AS topic_count,
                (SELECT COUNT(*) FROM questions q WHERE q.subject_id = s.id) AS question_count
            FROM subjects s
            ORDER BY s.position, s.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list subjects: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(subjects)
    }

    async fn fetch_subject(&self, id: &str) -> Result<Option<Subject>, AppError> {
        let Some(name) = sqlx::query_scalar::<_, String>("SELECT name FROM subjects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let topic_rows = sqlx::query_as::<_, TopicRow>(
            "SELECT id, name FROM topics WHERE subject_id = $1 ORDER BY position, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let question_rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT
                q.id,
                q.topic_id,
                q.question_text,
                q.marks,
                q.difficulty,
                q.model_answer,
                q.marking_criteria,
                q.spec_reference
            FROM questions q
            WHERE q.subject_id = $1
            ORDER BY q.position, q.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions for subject {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        let mut by_topic: HashMap<String, Vec<Question>> = HashMap::new();
        for row in question_rows {
            let topic_id = row.topic_id.clone();
            by_topic.entry(topic_id).or_default().push(Question::try_from(row)?);
        }

        let topics = topic_rows
            .into_iter()
            .map(|t| Topic {
                questions: by_topic.remove(&t.id).unwrap_or_default(),
                id: t.id,
                name: t.name,
            })
            .collect();

        Ok(Some(Subject {
            id: id.to_string(),
            name,
            topics,
        }))
    }

    async fn upsert_subject(&self, subject: &Subject) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO subjects (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(&subject.id)
        .bind(&subject.name)
        .execute(&mut *tx)
        .await?;

        // Questions go with their topics (ON DELETE CASCADE on the composite key).
        sqlx::query("DELETE FROM topics WHERE subject_id = $1")
            .bind(&subject.id)
            .execute(&mut *tx)
            .await?;

        for (topic_pos, topic) in subject.topics.iter().enumerate() {
            sqlx::query(
                "INSERT INTO topics (id, subject_id, name, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(&topic.id)
            .bind(&subject.id)
            .bind(&topic.name)
            .bind(topic_pos as i32)
            .execute(&mut *tx)
            .await?;

            for (question_pos, q) in topic.questions.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO questions
                    (subject_id, topic_id, id, question_text, marks, difficulty,
                     model_answer, marking_criteria, spec_reference, position)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    "#,
                )
                .bind(&subject.id)
                .bind(&topic.id)
                .bind(&q.id)
                .bind(&q.question_text)
                .bind(q.marks)
                .bind(q.difficulty.as_str())
                .bind(&q.model_answer)
                .bind(Json(&q.marking_criteria))
                .bind(&q.spec_reference)
                .bind(question_pos as i32)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_exam_configs(&self, user_id: &str) -> Result<Vec<CustomExamConfig>, AppError> {
        let rows = sqlx::query_as::<_, ExamConfigRow>(&format!(
            "SELECT {} FROM custom_exam_configs WHERE user_id = $1 ORDER BY updated_at DESC, id DESC",
            EXAM_CONFIG_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list exam configs: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        rows.into_iter().map(CustomExamConfig::try_from).collect()
    }

    async fn fetch_exam_config(
        &self,
        user_id: &str,
        id: i64,
    ) -> Result<Option<CustomExamConfig>, AppError> {
        sqlx::query_as::<_, ExamConfigRow>(&format!(
            "SELECT {} FROM custom_exam_configs WHERE id = $1 AND user_id = $2",
            EXAM_CONFIG_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(CustomExamConfig::try_from)
        .transpose()
    }

    async fn create_exam_config(
        &self,
        user_id: &str,
        req: &ExamConfigRequest,
    ) -> Result<CustomExamConfig, AppError> {
        let row = sqlx::query_as::<_, ExamConfigRow>(&format!(
            r#"
            INSERT INTO custom_exam_configs
            (user_id, title, subject_id, topic_ids, timer_minutes, difficulty, target_marks, question_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            EXAM_CONFIG_COLUMNS
        ))
        .bind(user_id)
        .bind(&req.title)
        .bind(&req.subject_id)
        .bind(&req.topic_ids)
        .bind(req.timer_minutes)
        .bind(req.difficulty.as_str())
        .bind(req.target_marks)
        .bind(req.question_count)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create exam config: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        row.try_into()
    }

    async fn update_exam_config(
        &self,
        user_id: &str,
        id: i64,
        req: &ExamConfigRequest,
    ) -> Result<Option<CustomExamConfig>, AppError> {
        sqlx::query_as::<_, ExamConfigRow>(&format!(
            r#"
            UPDATE custom_exam_configs SET
                title = $3,
                subject_id = $4,
                topic_ids = $5,
                timer_minutes = $6,
                difficulty = $7,
                target_marks = $8,
                question_count = $9,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            EXAM_CONFIG_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&req.title)
        .bind(&req.subject_id)
        .bind(&req.topic_ids)
        .bind(req.timer_minutes)
        .bind(req.difficulty.as_str())
        .bind(req.target_marks)
        .bind(req.question_count)
        .fetch_optional(&self.pool)
        .await?
        .map(CustomExamConfig::try_from)
        .transpose()
    }

    async fn delete_exam_config(&self, user_id: &str, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM custom_exam_configs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete exam config: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_exam(
        &self,
        user_id: &str,
        record: &NewExamRecord,
    ) -> Result<ExamRecord, AppError> {
        let stored = sqlx::query_as::<_, ExamRecord>(
            r#"
            INSERT INTO exam_results
            (user_id, subject_id, config_id, marks_awarded, marks_available,
             question_count, percentage, target_met)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, subject_id, config_id, marks_awarded, marks_available,
                      question_count, percentage, target_met, created_at
            "#,
        )
        .bind(user_id)
        .bind(&record.subject_id)
        .bind(record.config_id)
        .bind(record.marks_awarded)
        .bind(record.marks_available)
        .bind(record.question_count)
        .bind(record.percentage)
        .bind(record.target_met)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert exam result: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(stored)
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let board = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT
                user_id,
                COALESCE(SUM(marks_awarded), 0)::BIGINT AS points,
                COUNT(*) AS exams_taken
            FROM exam_results
            GROUP BY user_id
            ORDER BY points DESC, user_id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch leaderboard: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(board)
    }
}
