// tests/cache_tests.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use exam_prep::{
    config::Config,
    error::AppError,
    models::{
        curriculum::{Difficulty, Question, Subject, SubjectSummary, Topic},
        exam::{CustomExamConfig, ExamConfigRequest},
        exam_record::{ExamRecord, LeaderboardEntry, NewExamRecord},
    },
    state::AppState,
    store::{MemoryStore, Store},
};

fn config() -> Config {
    Config {
        database_url: None,
        jwt_secret: "cache_test_secret".to_string(),
        rust_log: "error".to_string(),
        port: 0,
        cache_ttl: Duration::from_secs(300),
        curriculum_seed_path: None,
    }
}

fn physics(name: &str) -> Subject {
    Subject {
        id: "physics".to_string(),
        name: name.to_string(),
        topics: vec![Topic {
            id: "forces".to_string(),
            name: "Forces".to_string(),
            questions: (0..5)
                .map(|i| Question {
                    id: format!("forces-{}", i),
                    question_text: format!("State Newton's law {}", i),
                    marks: 3,
                    difficulty: Difficulty::Medium,
                    model_answer: "See mark scheme".to_string(),
                    marking_criteria: Vec::new(),
                    spec_reference: None,
                })
                .collect(),
        }],
    }
}

#[tokio::test]
async fn cached_reads_hold_until_invalidated() {
    let store = Arc::new(MemoryStore::with_subjects(vec![physics("Physics")]));
    let state = AppState::new(store.clone(), config());

    let first = state.subject("physics").await.unwrap().unwrap();
    assert_eq!(first.name, "Physics");
    let listing = state.subject_listing().await.unwrap();
    assert_eq!(listing[0].name, "Physics");

    store.upsert_subject(&physics("GCSE Physics")).await.unwrap();

    // Served from the cache, the store change is not visible yet.
    let cached = state.subject("physics").await.unwrap().unwrap();
    assert_eq!(cached.name, "Physics");
    assert!(Arc::ptr_eq(&first, &cached));
    assert_eq!(state.subject_listing().await.unwrap()[0].name, "Physics");

    state.cache.invalidate_subject("physics");

    let fresh = state.subject("physics").await.unwrap().unwrap();
    assert_eq!(fresh.name, "GCSE Physics");
    assert_eq!(state.subject_listing().await.unwrap()[0].name, "GCSE Physics");

    store.upsert_subject(&physics("A-level Physics")).await.unwrap();
    state.cache.invalidate_all();
    let fresh = state.subject("physics").await.unwrap().unwrap();
    assert_eq!(fresh.name, "A-level Physics");
}

/// Store whose first `fetch_subject` pauses after reading until released.
struct GatedStore {
    inner: MemoryStore,
    gate_armed: AtomicBool,
    read_done: Notify,
    release: Notify,
}

#[async_trait]
impl Store for GatedStore {
    async fn list_subjects(&self) -> Result<Vec<SubjectSummary>, AppError> {
        self.inner.list_subjects().await
    }

    async fn fetch_subject(&self, id: &str) -> Result<Option<Subject>, AppError> {
        let subject = self.inner.fetch_subject(id).await?;
        if self.gate_armed.swap(false, Ordering::SeqCst) {
            self.read_done.notify_one();
            self.release.notified().await;
        }
        Ok(subject)
    }

    async fn upsert_subject(&self, subject: &Subject) -> Result<(), AppError> {
        self.inner.upsert_subject(subject).await
    }

    async fn list_exam_configs(&self, user_id: &str) -> Result<Vec<CustomExamConfig>, AppError> {
        self.inner.list_exam_configs(user_id).await
    }

    async fn fetch_exam_config(
        &self,
        user_id: &str,
        id: i64,
    ) -> Result<Option<CustomExamConfig>, AppError> {
        self.inner.fetch_exam_config(user_id, id).await
    }

    async fn create_exam_config(
        &self,
        user_id: &str,
        req: &ExamConfigRequest,
    ) -> Result<CustomExamConfig, AppError> {
        self.inner.create_exam_config(user_id, req).await
    }

    async fn update_exam_config(
        &self,
        user_id: &str,
        id: i64,
        req: &ExamConfigRequest,
    ) -> Result<Option<CustomExamConfig>, AppError> {
        self.inner.update_exam_config(user_id, id, req).await
    }

    async fn delete_exam_config(&self, user_id: &str, id: i64) -> Result<bool, AppError> {
        self.inner.delete_exam_config(user_id, id).await
    }

    async fn record_exam(
        &self,
        user_id: &str,
        record: &NewExamRecord,
    ) -> Result<ExamRecord, AppError> {
        self.inner.record_exam(user_id, record).await
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        self.inner.leaderboard(limit).await
    }
}

#[tokio::test]
async fn read_in_flight_during_invalidation_is_not_cached() {
    let store = Arc::new(GatedStore {
        inner: MemoryStore::with_subjects(vec![physics("Old physics")]),
        gate_armed: AtomicBool::new(true),
        read_done: Notify::new(),
        release: Notify::new(),
    });
    let state = AppState::new(store.clone(), config());

    let reader = tokio::spawn({
        let state = state.clone();
        async move { state.subject("physics").await }
    });

    // The reader now holds the old tree; change the store and invalidate
    // before letting it finish.
    store.read_done.notified().await;
    store.upsert_subject(&physics("New physics")).await.unwrap();
    state.cache.invalidate_all();
    store.release.notify_one();

    let stale = reader.await.unwrap().unwrap().unwrap();
    assert_eq!(stale.name, "Old physics");
    assert!(state.cache.subject("physics").is_none());

    let fresh = state.subject("physics").await.unwrap().unwrap();
    assert_eq!(fresh.name, "New physics");
}
