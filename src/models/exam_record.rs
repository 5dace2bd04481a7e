// src/models/exam_record.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'exam_results' table in the database.
/// Stores the outcome of self-marked attempts.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExamRecord {
    pub id: i64,
    pub user_id: String,
    pub subject_id: String,
    pub config_id: Option<i64>,
    pub marks_awarded: i32,
    pub marks_available: i32,
    pub question_count: i32,
    pub percentage: f64,
    pub target_met: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Values of a scored attempt, before it is stored.
#[derive(Debug, Clone)]
pub struct NewExamRecord {
    pub subject_id: String,
    pub config_id: Option<i64>,
    pub marks_awarded: i32,
    pub marks_available: i32,
    pub question_count: i32,
    pub percentage: f64,
    pub target_met: bool,
}

/// Aggregated struct for displaying the leaderboard.
/// Points are the sum of marks awarded across all attempts.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub points: i64,
    pub exams_taken: i64,
}
