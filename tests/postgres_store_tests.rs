// tests/postgres_store_tests.rs

use exam_prep::{
    models::curriculum::{Difficulty, Question, Subject, Topic},
    store::{PgStore, Store},
};
use sqlx::postgres::PgPoolOptions;

/// Connects to DATABASE_URL and applies migrations. `None` without a database.
async fn store() -> Option<PgStore> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres store test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(PgStore::new(pool))
}

fn question(id: &str, text: &str) -> Question {
    Question {
        id: id.to_string(),
        question_text: text.to_string(),
        marks: 2,
        difficulty: Difficulty::Easy,
        model_answer: "x = 3".to_string(),
        marking_criteria: Vec::new(),
        spec_reference: None,
    }
}

fn maths(id: &str, label: &str) -> Subject {
    Subject {
        id: id.to_string(),
        name: label.to_string(),
        topics: vec![
            Topic {
                id: "algebra".to_string(),
                name: "Algebra".to_string(),
                questions: vec![
                    question("q1", &format!("{} solve 2x = 6", label)),
                    question("q2", &format!("{} expand (x + 1)^2", label)),
                ],
            },
            Topic {
                id: "geometry".to_string(),
                name: "Geometry".to_string(),
                // Same question id as in algebra, scoped by its topic.
                questions: vec![question("q1", &format!("{} angle sum", label))],
            },
        ],
    }
}

#[tokio::test]
async fn subjects_can_share_topic_and_question_ids() {
    let Some(store) = store().await else {
        return;
    };
    let suffix = &uuid::Uuid::new_v4().to_string()[..8];
    let gcse = maths(&format!("gcse-maths-{}", suffix), "GCSE");
    let sat = maths(&format!("sat-maths-{}", suffix), "SAT");

    store.upsert_subject(&gcse).await.expect("First subject failed");
    store.upsert_subject(&sat).await.expect("Subject reusing topic ids failed");
    // Replacing a subject keeps the other one intact.
    store.upsert_subject(&gcse).await.expect("Re-upsert failed");

    let loaded = store.fetch_subject(&sat.id).await.unwrap().unwrap();
    assert_eq!(loaded.topics.len(), 2);
    assert_eq!(loaded.topics[0].id, "algebra");
    assert_eq!(loaded.topics[0].questions.len(), 2);
    assert_eq!(loaded.topics[0].questions[0].question_text, "SAT solve 2x = 6");
    assert_eq!(loaded.topics[1].questions[0].question_text, "SAT angle sum");

    let listing = store.list_subjects().await.unwrap();
    let summary = listing.iter().find(|s| s.id == gcse.id).unwrap();
    assert_eq!(summary.topic_count, 2);
    assert_eq!(summary.question_count, 3);
}
