// src/models/exam.rs

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::curriculum::{Difficulty, MarkingPoint, Question};

/// Which difficulty tier(s) a generated exam draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DifficultyFilter {
    Easy,
    Medium,
    Hard,
    Mixed,
    #[serde(rename = "predicted-2026")]
    Predicted2026,
}

impl DifficultyFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyFilter::Easy => "easy",
            DifficultyFilter::Medium => "medium",
            DifficultyFilter::Hard => "hard",
            DifficultyFilter::Mixed => "mixed",
            DifficultyFilter::Predicted2026 => "predicted-2026",
        }
    }

    /// The single tier this filter pins questions to, if any.
    pub fn tier(&self) -> Option<Difficulty> {
        match self {
            DifficultyFilter::Easy => Some(Difficulty::Easy),
            DifficultyFilter::Medium => Some(Difficulty::Medium),
            DifficultyFilter::Hard => Some(Difficulty::Hard),
            DifficultyFilter::Mixed | DifficultyFilter::Predicted2026 => None,
        }
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(DifficultyFilter::Easy),
            "medium" => Ok(DifficultyFilter::Medium),
            "hard" => Ok(DifficultyFilter::Hard),
            "mixed" => Ok(DifficultyFilter::Mixed),
            "predicted-2026" => Ok(DifficultyFilter::Predicted2026),
            other => Err(format!("Unknown difficulty filter '{}'", other)),
        }
    }
}

/// Input of the question selector: what to draw and from where.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExamConfig {
    #[validate(length(min = 1, max = 100))]
    pub subject_id: String,

    #[validate(length(min = 1, message = "Select at least one topic."))]
    pub topic_ids: Vec<String>,

    #[validate(range(min = 1, max = 200))]
    pub question_count: usize,

    pub difficulty: DifficultyFilter,
}

/// A question placed at a numbered position of a generated exam.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamQuestion {
    pub question_number: usize,
    pub id: String,
    pub topic_id: String,
    pub topic_name: String,
    pub question_text: String,
    pub marks: i32,
    pub difficulty: Difficulty,
    pub model_answer: String,
    pub marking_criteria: Vec<MarkingPoint>,
    pub spec_reference: Option<String>,
}

impl ExamQuestion {
    /// Projects a curriculum question into an exam slot. Numbering is
    /// assigned once the final order is known.
    pub fn from_question(question: &Question, topic_id: &str, topic_name: &str) -> Self {
        Self {
            question_number: 0,
            id: question.id.clone(),
            topic_id: topic_id.to_string(),
            topic_name: topic_name.to_string(),
            question_text: question.question_text.clone(),
            marks: question.marks,
            difficulty: question.difficulty,
            model_answer: question.model_answer.clone(),
            marking_criteria: question.marking_criteria.clone(),
            spec_reference: question.spec_reference.clone(),
        }
    }
}

/// Persisted custom exam configuration owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomExamConfig {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub subject_id: String,
    pub topic_ids: Vec<String>,
    pub timer_minutes: i32,
    pub difficulty: DifficultyFilter,
    pub target_marks: i32,
    pub question_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl CustomExamConfig {
    pub fn exam_config(&self) -> ExamConfig {
        ExamConfig {
            subject_id: self.subject_id.clone(),
            topic_ids: self.topic_ids.clone(),
            question_count: self.question_count.max(0) as usize,
            difficulty: self.difficulty,
        }
    }
}

/// DTO for creating or replacing a custom exam configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExamConfigRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub subject_id: String,
    #[validate(length(min = 1, message = "Select at least one topic."))]
    pub topic_ids: Vec<String>,
    #[validate(range(min = 1, max = 300))]
    pub timer_minutes: i32,
    pub difficulty: DifficultyFilter,
    #[validate(range(min = 0, max = 1000))]
    pub target_marks: i32,
    #[validate(range(min = 1, max = 200))]
    pub question_count: i32,
}

/// DTO for returning a generated exam.
#[derive(Debug, Serialize)]
pub struct GeneratedExam {
    pub subject_id: String,
    pub difficulty: DifficultyFilter,
    pub total_marks: i32,
    pub questions: Vec<ExamQuestion>,
}

impl GeneratedExam {
    pub fn new(subject_id: String, difficulty: DifficultyFilter, questions: Vec<ExamQuestion>) -> Self {
        Self {
            subject_id,
            difficulty,
            total_marks: questions.iter().map(|q| q.marks).sum(),
            questions,
        }
    }
}

/// A generated exam together with the saved configuration's exam settings.
#[derive(Debug, Serialize)]
pub struct ConfiguredExam {
    pub config_id: i64,
    pub title: String,
    pub timer_minutes: i32,
    pub target_marks: i32,
    #[serde(flatten)]
    pub exam: GeneratedExam,
}

/// DTO for submitting a self-marked attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    pub subject_id: String,

    /// Saved configuration the attempt was generated from, if any.
    pub config_id: Option<i64>,

    /// Target marks when no saved configuration is referenced.
    pub target_marks: Option<i32>,

    /// Key: question id, value: marks the student awarded themselves.
    pub awarded: HashMap<String, i32>,
}
