// src/services/exam_generator.rs

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};

use crate::{
    config::{MIN_EXAM_QUESTIONS, PREDICTED_EASY_PERCENT, PREDICTED_MEDIUM_PERCENT},
    error::ExamError,
    models::{
        curriculum::{Difficulty, Question, Subject, Topic},
        exam::{DifficultyFilter, ExamConfig, ExamQuestion},
    },
};

/// Builds a practice exam from the selected topics of `subject`.
///
/// * `predicted-2026` samples a 30/50/20 easy/medium/hard mix from all selected topics.
/// * Any other filter spreads questions evenly across topics, round-robin.
///
/// The result is shuffled, numbered 1..N, never longer than `question_count`,
/// and rejected when shorter than the minimum exam size.
pub fn generate_exam<R: Rng + ?Sized>(
    subject: &Subject,
    config: &ExamConfig,
    rng: &mut R,
) -> Result<Vec<ExamQuestion>, ExamError> {
    // Keep subject order so the round-robin walk is stable.
    let topics: Vec<&Topic> = subject
        .topics
        .iter()
        .filter(|t| config.topic_ids.iter().any(|id| id == &t.id))
        .collect();

    if topics.is_empty() {
        return Err(ExamError::NoTopicsSelected);
    }

    let mut selected = match config.difficulty {
        DifficultyFilter::Predicted2026 => predicted_paper(&topics, config.question_count, rng)?,
        filter => distribute_by_topic(&topics, filter, config.question_count, rng)?,
    };

    selected.shuffle(rng);
    selected.truncate(config.question_count);
    for (idx, question) in selected.iter_mut().enumerate() {
        question.question_number = idx + 1;
    }

    if selected.len() < MIN_EXAM_QUESTIONS {
        return Err(ExamError::InsufficientQuestions {
            available: selected.len(),
            required: MIN_EXAM_QUESTIONS,
        });
    }

    tracing::debug!(
        "Generated {} question exam for subject {} ({})",
        selected.len(),
        subject.id,
        config.difficulty
    );

    Ok(selected)
}

/// Per-tier targets of a predicted paper. Always sums to `count`.
fn predicted_targets(count: usize) -> [usize; 3] {
    let easy = count * PREDICTED_EASY_PERCENT / 100;
    let medium = count * PREDICTED_MEDIUM_PERCENT / 100;
    [easy, medium, count - easy - medium]
}

fn tier_index(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    }
}

fn predicted_paper<R: Rng + ?Sized>(
    topics: &[&Topic],
    count: usize,
    rng: &mut R,
) -> Result<Vec<ExamQuestion>, ExamError> {
    let mut tiers: [Vec<ExamQuestion>; 3] = Default::default();
    let mut seen = HashSet::new();

    for topic in topics {
        for question in &topic.questions {
            if seen.insert(question.id.as_str()) {
                tiers[tier_index(question.difficulty)].push(ExamQuestion::from_question(
                    question,
                    &topic.id,
                    &topic.name,
                ));
            }
        }
    }

    if tiers.iter().all(Vec::is_empty) {
        return Err(ExamError::NoMatchingQuestions(
            DifficultyFilter::Predicted2026.to_string(),
        ));
    }

    // Short tiers are not topped up from the others.
    let mut paper = Vec::with_capacity(count);
    for (pool, target) in tiers.iter_mut().zip(predicted_targets(count)) {
        pool.shuffle(rng);
        pool.truncate(target);
        paper.append(pool);
    }

    Ok(paper)
}

/// Takes the next question from `pool` that has not been used yet.
fn next_unseen<'a>(
    pool: &[&'a Question],
    cursor: &mut usize,
    seen: &mut HashSet<&'a str>,
) -> Option<&'a Question> {
    while let Some(&question) = pool.get(*cursor) {
        *cursor += 1;
        if seen.insert(question.id.as_str()) {
            return Some(question);
        }
    }
    None
}

fn distribute_by_topic<R: Rng + ?Sized>(
    topics: &[&Topic],
    filter: DifficultyFilter,
    count: usize,
    rng: &mut R,
) -> Result<Vec<ExamQuestion>, ExamError> {
    let tier = filter.tier();

    let pools: Vec<Vec<&Question>> = topics
        .iter()
        .map(|topic| {
            let mut pool: Vec<&Question> = topic
                .questions
                .iter()
                .filter(|q| tier.is_none_or(|d| q.difficulty == d))
                .collect();
            pool.shuffle(rng);
            pool
        })
        .collect();

    if pools.iter().all(Vec::is_empty) {
        return Err(ExamError::NoMatchingQuestions(filter.to_string()));
    }

    let even_quota = count / topics.len();
    let mut cursors = vec![0usize; topics.len()];
    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(count);

    // Pass one: one question per topic per round, up to the even quota.
    for _ in 0..even_quota {
        for (idx, topic) in topics.iter().enumerate() {
            if let Some(question) = next_unseen(&pools[idx], &mut cursors[idx], &mut seen) {
                selected.push(ExamQuestion::from_question(question, &topic.id, &topic.name));
            }
        }
    }

    // Pass two: remainder slots plus any shortfall, first topic first.
    while selected.len() < count {
        let mut progressed = false;
        for (idx, topic) in topics.iter().enumerate() {
            if selected.len() == count {
                break;
            }
            if let Some(question) = next_unseen(&pools[idx], &mut cursors[idx], &mut seen) {
                selected.push(ExamQuestion::from_question(question, &topic.id, &topic.name));
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    Ok(selected)
}
