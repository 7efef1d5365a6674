//! Backend for the agency website's contact form.
//!
//! One real endpoint, `POST /api/contact`: validate the submission, rate limit
//! per client IP, then email the agency inbox and thank the sender.

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod mailer;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod templates;
pub mod validation;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

pub use config::Args;
pub use error::ContactError;
pub use state::{AppState, MailService};

// Contact payloads are a few kilobytes at most
const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/contact", post(handlers::contact_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
