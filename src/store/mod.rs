// src/store/mod.rs

//! Persistence behind the handlers.
//!
//! `PgStore` talks to the hosted Postgres database; `MemoryStore` keeps the
//! same tables in process for tests and database-less runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        curriculum::{Subject, SubjectSummary},
        exam::{CustomExamConfig, ExamConfigRequest},
        exam_record::{ExamRecord, LeaderboardEntry, NewExamRecord},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_subjects(&self) -> Result<Vec<SubjectSummary>, AppError>;

    /// Loads the full subject -> topic -> question tree, in display order.
    async fn fetch_subject(&self, id: &str) -> Result<Option<Subject>, AppError>;

    /// Inserts or replaces a subject together with its topics and questions.
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), AppError>;

    async fn list_exam_configs(&self, user_id: &str) -> Result<Vec<CustomExamConfig>, AppError>;

    async fn fetch_exam_config(
        &self,
        user_id: &str,
        id: i64,
    ) -> Result<Option<CustomExamConfig>, AppError>;

    async fn create_exam_config(
        &self,
        user_id: &str,
        req: &ExamConfigRequest,
    ) -> Result<CustomExamConfig, AppError>;

    /// Returns `None` when the config does not exist or belongs to someone else.
    async fn update_exam_config(
        &self,
        user_id: &str,
        id: i64,
        req: &ExamConfigRequest,
    ) -> Result<Option<CustomExamConfig>, AppError>;

    async fn delete_exam_config(&self, user_id: &str, id: i64) -> Result<bool, AppError>;

    async fn record_exam(
        &self,
        user_id: &str,
        record: &NewExamRecord,
    ) -> Result<ExamRecord, AppError>;

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError>;
}
