// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, curriculum, exam, exam_config},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (subjects, exams, exam configs, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, curriculum cache, config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            axum::http::HeaderValue::from_static("http://localhost:3000"),
            axum::http::HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let subject_routes = Router::new()
        .route("/", get(curriculum::list_subjects))
        .route("/{id}", get(curriculum::get_subject));

    let exam_routes = Router::new()
        .route("/generate", post(exam::generate_exam))
        // Protected exam routes
        .merge(
            Router::new()
                .route("/submit", post(exam::submit_exam))
                .layer(auth.clone()),
        );

    let exam_config_routes = Router::new()
        .route(
            "/",
            get(exam_config::list_exam_configs).post(exam_config::create_exam_config),
        )
        .route(
            "/{id}",
            get(exam_config::get_exam_config)
                .put(exam_config::update_exam_config)
                .delete(exam_config::delete_exam_config),
        )
        .route("/{id}/generate", post(exam_config::generate_from_config))
        .layer(auth.clone());

    let admin_routes = Router::new()
        .route("/cache/invalidate", post(admin::invalidate_cache))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(auth);

    Router::new()
        .nest("/api/subjects", subject_routes)
        .nest("/api/exams", exam_routes)
        .nest("/api/exam-configs", exam_config_routes)
        .route("/api/leaderboard", get(exam::get_leaderboard))
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
