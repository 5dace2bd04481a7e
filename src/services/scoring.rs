// src/services/scoring.rs

use std::collections::HashMap;

use serde::Serialize;

use crate::models::curriculum::Subject;

/// Outcome of a self-marked attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamScore {
    pub question_count: usize,
    pub marks_awarded: i32,
    pub marks_available: i32,
    pub percentage: f64,
    pub target_marks: Option<i32>,
    pub target_met: bool,
}

/// Scores an attempt against the subject's mark allocations.
///
/// Awarded marks are clamped to `0..=question.marks`; ids not found in the
/// subject are ignored. Returns `None` when nothing recognisable was submitted.
pub fn score_attempt(
    subject: &Subject,
    awarded: &HashMap<String, i32>,
    target_marks: Option<i32>,
) -> Option<ExamScore> {
    let mut question_count = 0;
    let mut marks_awarded = 0;
    let mut marks_available = 0;

    for (question_id, marks) in awarded {
        let Some(question) = subject.find_question(question_id) else {
            tracing::debug!("Ignoring unknown question {} in attempt", question_id);
            continue;
        };
        question_count += 1;
        marks_available += question.marks;
        marks_awarded += (*marks).clamp(0, question.marks.max(0));
    }

    if question_count == 0 {
        return None;
    }

    let percentage = if marks_available > 0 {
        marks_awarded as f64 / marks_available as f64 * 100.0
    } else {
        0.0
    };

    Some(ExamScore {
        question_count,
        marks_awarded,
        marks_available,
        percentage,
        target_marks,
        target_met: target_marks.is_none_or(|target| marks_awarded >= target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::curriculum::{Difficulty, Question, Topic};

    fn subject() -> Subject {
        let question = |id: &str, marks| Question {
            id: id.to_string(),
            question_text: "Explain.".to_string(),
            marks,
            difficulty: Difficulty::Medium,
            model_answer: "Because.".to_string(),
            marking_criteria: Vec::new(),
            spec_reference: None,
        };
        Subject {
            id: "chemistry".to_string(),
            name: "Chemistry".to_string(),
            topics: vec![Topic {
                id: "bonding".to_string(),
                name: "Bonding".to_string(),
                questions: vec![question("q1", 4), question("q2", 6)],
            }],
        }
    }

    fn awarded(pairs: &[(&str, i32)]) -> HashMap<String, i32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn full_marks() {
        let score = score_attempt(&subject(), &awarded(&[("q1", 4), ("q2", 6)]), Some(10)).unwrap();
        assert_eq!(score.marks_awarded, 10);
        assert_eq!(score.marks_available, 10);
        assert_eq!(score.percentage, 100.0);
        assert!(score.target_met);
    }

    #[test]
    fn awarded_marks_are_clamped() {
        let score = score_attempt(&subject(), &awarded(&[("q1", 9), ("q2", -3)]), Some(5)).unwrap();
        assert_eq!(score.marks_awarded, 4);
        assert_eq!(score.percentage, 40.0);
        assert!(!score.target_met);
    }

    #[test]
    fn unknown_questions_are_ignored() {
        let score = score_attempt(&subject(), &awarded(&[("q2", 3), ("zz", 5)]), None).unwrap();
        assert_eq!(score.question_count, 1);
        assert_eq!(score.marks_available, 6);
        assert_eq!(score.percentage, 50.0);
        assert!(score.target_met);
    }

    #[test]
    fn nothing_recognised() {
        assert!(score_attempt(&subject(), &awarded(&[("zz", 1)]), None).is_none());
        assert!(score_attempt(&subject(), &HashMap::new(), None).is_none());
    }
}
