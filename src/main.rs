// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use exam_prep::config::Config;
use exam_prep::error::AppError;
use exam_prep::models::curriculum::Subject;
use exam_prep::routes;
use exam_prep::state::AppState;
use exam_prep::store::{MemoryStore, PgStore, Store};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => Arc::new(PgStore::new(connect_database(database_url).await)),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // Seed Curriculum
    if let Some(path) = &config.curriculum_seed_path {
        if let Err(e) = seed_curriculum(store.as_ref(), path).await {
            tracing::error!("Failed to seed curriculum from {}: {:?}", path, e);
        }
    }

    // Create AppState
    let state = AppState::new(store, config.clone());

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}

/// Connects to Postgres with retry and applies pending migrations.
async fn connect_database(database_url: &str) -> sqlx::PgPool {
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    pool
}

/// Upserts every subject found in the JSON seed file.
async fn seed_curriculum(store: &dyn Store, path: &str) -> Result<(), AppError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    let subjects: Vec<Subject> = serde_json::from_str(&raw)?;

    for subject in &subjects {
        tracing::info!("Seeding subject: {}", subject.id);
        store.upsert_subject(subject).await?;
    }
    tracing::info!("Seeded {} subjects.", subjects.len());

    Ok(())
}
