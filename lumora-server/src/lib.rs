//! lumora-server library
//!
//! JSON HTTP backend for the Lumora app-review marketplace and customer
//! research platform.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use error::{ApiError, ApiResult};
use services::ChatModel;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Language model behind every AI feature
    pub chat: Arc<dyn ChatModel>,
    /// Client for fetching submitted websites
    pub http: reqwest::Client,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, chat: Arc<dyn ChatModel>) -> Self {
        Self {
            db,
            chat,
            http: reqwest::Client::new(),
        }
    }
}

/// Build application router
///
/// Routes that need a signed-in user sit behind the session middleware;
/// read-only marketplace routes and the health check are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Protected routes (require a session)
    let protected = Router::new()
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/user/me", get(api::users::me))
        .route("/api/user/profile", put(api::users::update_profile))
        .route("/api/user/password", put(api::users::change_password))
        .route("/api/dashboard", get(api::dashboard::get_dashboard))
        .route("/api/apps", post(api::apps::create_app))
        .route("/api/apps/analyze", post(api::apps::analyze_url))
        .route(
            "/api/apps/:id",
            put(api::apps::update_app).delete(api::apps::delete_app),
        )
        .route("/api/apps/:id/reviews", post(api::reviews::create_review))
        .route(
            "/api/apps/:id/reviews/:review_id",
            axum::routing::delete(api::reviews::delete_review),
        )
        .route(
            "/api/apps/:id/reviews/:review_id/respond",
            put(api::reviews::respond_to_review),
        )
        .route("/api/apps/:id/reviews/:review_id/vote", post(api::votes::cast_vote))
        .route("/api/apps/:id/ai-review", post(api::reviews::request_ai_review))
        .route("/api/reviews/mine", get(api::reviews::my_reviews))
        .route(
            "/api/studies",
            get(api::studies::list_studies).post(api::studies::create_study),
        )
        .route(
            "/api/studies/:id",
            get(api::studies::get_study).delete(api::studies::delete_study),
        )
        .route(
            "/api/studies/:id/generate-guide",
            post(api::guides::generate_guide).put(api::guides::update_guide),
        )
        .route("/api/studies/:id/synthesize", post(api::insights::synthesize))
        .route("/api/studies/:id/insights", get(api::insights::latest_insight))
        .route(
            "/api/interview",
            get(api::interviews::list_interviews).post(api::interviews::start_interview),
        )
        .route("/api/interview/:id", get(api::interviews::get_interview))
        .route("/api/interview/:id/chat", post(api::interviews::chat))
        .route("/api/interview/:id/end", post(api::interviews::end_interview))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session::require_session,
        ));

    // Public routes (session attached when present)
    let public = Router::new()
        .route("/api/auth/signup", post(api::auth::signup))
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/apps", get(api::apps::list_apps))
        .route("/api/apps/:id", get(api::apps::get_app))
        .route("/api/apps/:id/reviews", get(api::reviews::list_reviews))
        .route("/api/apps/:id/reviews/summary", get(api::reviews::review_summary))
        .route("/api/apps/:id/reviews/:review_id/vote", get(api::votes::vote_counts))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session::attach_session,
        ))
        .merge(api::health_routes());

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
