// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        curriculum::{Subject, SubjectSummary},
        exam::{CustomExamConfig, ExamConfigRequest},
        exam_record::{ExamRecord, LeaderboardEntry, NewExamRecord},
    },
    store::Store,
};

#[derive(Default)]
struct Tables {
    /// Insertion order doubles as display order.
    subjects: Vec<Subject>,
    exam_configs: Vec<CustomExamConfig>,
    exam_records: Vec<ExamRecord>,
    next_config_id: i64,
    next_record_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subjects(subjects: Vec<Subject>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                subjects,
                ..Tables::default()
            }),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_subjects(&self) -> Result<Vec<SubjectSummary>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.subjects.iter().map(Subject::summary).collect())
    }

    async fn fetch_subject(&self, id: &str) -> Result<Option<Subject>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.subjects.iter().find(|s| s.id == id).cloned())
    }

    async fn upsert_subject(&self, subject: &Subject) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        match tables.subjects.iter_mut().find(|s| s.id == subject.id) {
            Some(existing) => *existing = subject.clone(),
            None => tables.subjects.push(subject.clone()),
        }
        Ok(())
    }

    async fn list_exam_configs(&self, user_id: &str) -> Result<Vec<CustomExamConfig>, AppError> {
        let tables = self.tables.read().await;
        let mut configs: Vec<CustomExamConfig> = tables
            .exam_configs
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        configs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(configs)
    }

    async fn fetch_exam_config(
        &self,
        user_id: &str,
        id: i64,
    ) -> Result<Option<CustomExamConfig>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .exam_configs
            .iter()
            .find(|c| c.id == id && c.user_id == user_id)
            .cloned())
    }

    async fn create_exam_config(
        &self,
        user_id: &str,
        req: &ExamConfigRequest,
    ) -> Result<CustomExamConfig, AppError> {
        let mut tables = self.tables.write().await;
        tables.next_config_id += 1;
        let now = Utc::now();
        let config = CustomExamConfig {
            id: tables.next_config_id,
            user_id: user_id.to_string(),
            title: req.title.clone(),
            subject_id: req.subject_id.clone(),
            topic_ids: req.topic_ids.clone(),
            timer_minutes: req.timer_minutes,
            difficulty: req.difficulty,
            target_marks: req.target_marks,
            question_count: req.question_count,
            created_at: now,
            updated_at: now,
        };
        tables.exam_configs.push(config.clone());
        Ok(config)
    }

    async fn update_exam_config(
        &self,
        user_id: &str,
        id: i64,
        req: &ExamConfigRequest,
    ) -> Result<Option<CustomExamConfig>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(config) = tables
            .exam_configs
            .iter_mut()
            .find(|c| c.id == id && c.user_id == user_id)
        else {
            return Ok(None);
        };

        config.title = req.title.clone();
        config.subject_id = req.subject_id.clone();
        config.topic_ids = req.topic_ids.clone();
        config.timer_minutes = req.timer_minutes;
        config.difficulty = req.difficulty;
        config.target_marks = req.target_marks;
        config.question_count = req.question_count;
        config.updated_at = Utc::now();

        Ok(Some(config.clone()))
    }

    async fn delete_exam_config(&self, user_id: &str, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.exam_configs.len();
        tables
            .exam_configs
            .retain(|c| !(c.id == id && c.user_id == user_id));
        Ok(tables.exam_configs.len() < before)
    }

    async fn record_exam(
        &self,
        user_id: &str,
        record: &NewExamRecord,
    ) -> Result<ExamRecord, AppError> {
        let mut tables = self.tables.write().await;
        tables.next_record_id += 1;
        let stored = ExamRecord {
            id: tables.next_record_id,
            user_id: user_id.to_string(),
            subject_id: record.subject_id.clone(),
            config_id: record.config_id,
            marks_awarded: record.marks_awarded,
            marks_available: record.marks_available,
            question_count: record.question_count,
            percentage: record.percentage,
            target_met: record.target_met,
            created_at: Utc::now(),
        };
        tables.exam_records.push(stored.clone());
        Ok(stored)
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let tables = self.tables.read().await;
        let mut totals: HashMap<&str, (i64, i64)> = HashMap::new();
        for record in &tables.exam_records {
            let entry = totals.entry(record.user_id.as_str()).or_default();
            entry.0 += i64::from(record.marks_awarded);
            entry.1 += 1;
        }

        let mut board: Vec<LeaderboardEntry> = totals
            .into_iter()
            .map(|(user_id, (points, exams_taken))| LeaderboardEntry {
                user_id: user_id.to_string(),
                points,
                exams_taken,
            })
            .collect();
        board.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.user_id.cmp(&b.user_id)));
        board.truncate(limit.max(0) as usize);
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exam::DifficultyFilter;

    fn request(title: &str) -> ExamConfigRequest {
        ExamConfigRequest {
            title: title.to_string(),
            subject_id: "biology".to_string(),
            topic_ids: vec!["cells".to_string()],
            timer_minutes: 45,
            difficulty: DifficultyFilter::Mixed,
            target_marks: 30,
            question_count: 10,
        }
    }

    fn record(marks_awarded: i32) -> NewExamRecord {
        NewExamRecord {
            subject_id: "biology".to_string(),
            config_id: None,
            marks_awarded,
            marks_available: 20,
            question_count: 5,
            percentage: marks_awarded as f64 / 20.0 * 100.0,
            target_met: true,
        }
    }

    #[tokio::test]
    async fn configs_are_scoped_to_their_owner() {
        let store = MemoryStore::new();
        let created = store.create_exam_config("alice", &request("Mock")).await.unwrap();

        assert!(store.fetch_exam_config("bob", created.id).await.unwrap().is_none());
        assert!(store.update_exam_config("bob", created.id, &request("Hijack")).await.unwrap().is_none());
        assert!(!store.delete_exam_config("bob", created.id).await.unwrap());

        let updated = store
            .update_exam_config("alice", created.id, &request("Renamed"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(store.list_exam_configs("alice").await.unwrap().len(), 1);

        assert!(store.delete_exam_config("alice", created.id).await.unwrap());
        assert!(store.list_exam_configs("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn leaderboard_sums_points_per_user() {
        let store = MemoryStore::new();
        store.record_exam("alice", &record(10)).await.unwrap();
        store.record_exam("bob", &record(15)).await.unwrap();
        store.record_exam("alice", &record(8)).await.unwrap();
        store.record_exam("carol", &record(1)).await.unwrap();

        let board = store.leaderboard(2).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, "alice");
        assert_eq!(board[0].points, 18);
        assert_eq!(board[0].exams_taken, 2);
        assert_eq!(board[1].user_id, "bob");
    }

    #[tokio::test]
    async fn upsert_replaces_existing_subject() {
        let store = MemoryStore::new();
        let mut subject = Subject {
            id: "physics".to_string(),
            name: "Physics".to_string(),
            topics: Vec::new(),
        };
        store.upsert_subject(&subject).await.unwrap();
        subject.name = "GCSE Physics".to_string();
        store.upsert_subject(&subject).await.unwrap();

        let listed = store.list_subjects().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "GCSE Physics");
    }
}
