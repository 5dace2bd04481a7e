// src/models/curriculum.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Difficulty tier of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty '{}'", other)),
        }
    }
}

/// One mark-earning point of a question's mark scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkingPoint {
    pub point: String,
    pub marks: i32,
}

/// A practice question as stored in the curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    pub question_text: String,

    /// Marks available for a fully correct answer.
    pub marks: i32,

    pub difficulty: Difficulty,

    pub model_answer: String,

    /// Breakdown of how the marks are earned.
    #[serde(default)]
    pub marking_criteria: Vec<MarkingPoint>,

    /// Exam board specification reference (e.g. "4.1.2").
    #[serde(default)]
    pub spec_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Root of the curriculum tree: subject -> topics -> questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

impl Subject {
    pub fn summary(&self) -> SubjectSummary {
        SubjectSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            topic_count: self.topics.len() as i64,
            question_count: self.topics.iter().map(|t| t.questions.len() as i64).sum(),
        }
    }

    /// Looks up a question anywhere in the subject tree.
    pub fn find_question(&self, question_id: &str) -> Option<&Question> {
        self.topics
            .iter()
            .flat_map(|t| t.questions.iter())
            .find(|q| q.id == question_id)
    }
}

/// Lightweight listing row for the subject picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubjectSummary {
    pub id: String,
    pub name: String,
    pub topic_count: i64,
    pub question_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_lowercase_only() {
        assert_eq!("easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("Hard".parse::<Difficulty>().is_err());
    }

    #[test]
    fn subject_deserializes_without_optional_fields() {
        let subject: Subject = serde_json::from_value(serde_json::json!({
            "id": "biology",
            "name": "Biology",
            "topics": [{
                "id": "cells",
                "name": "Cells",
                "questions": [{
                    "id": "q1",
                    "question_text": "Name the powerhouse of the cell.",
                    "marks": 1,
                    "difficulty": "easy",
                    "model_answer": "Mitochondria"
                }]
            }]
        }))
        .unwrap();

        let summary = subject.summary();
        assert_eq!(summary.topic_count, 1);
        assert_eq!(summary.question_count, 1);
        assert!(subject.find_question("q1").unwrap().marking_criteria.is_empty());
        assert!(subject.find_question("missing").is_none());
    }
}
