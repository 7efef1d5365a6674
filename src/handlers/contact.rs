use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ContactError;
use crate::metrics::{EMAILS_SENT, SUBMISSION_LATENCY, SUBMISSIONS_REJECTED, SUBMISSIONS_TOTAL};
use crate::models::{ContactResponse, ContactSubmission};
use crate::rate_limit::client_ip;
use crate::state::AppState;
use crate::templates::{notification_email, thank_you_email};
use crate::validation::validate_submission;

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ContactResponse>, ContactError> {
    SUBMISSIONS_TOTAL.inc();

    let result = process(&state, &headers, &body).await;
    if let Err(e) = &result {
        SUBMISSIONS_REJECTED.with_label_values(&[e.reason()]).inc();
    }
    result.map(Json)
}

async fn process(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<ContactResponse, ContactError> {
    let ip = client_ip(headers);
    let now = Utc::now();

    let decision = state.rate_limiter.check_at(&ip, now).await;
    if !decision.allowed {
        tracing::warn!(client = %ip, "contact form rate limit exceeded");
        return Err(ContactError::RateLimited {
            retry_after: decision.retry_after_secs(now),
        });
    }

    let submission: ContactSubmission =
        serde_json::from_slice(body).map_err(ContactError::InvalidBody)?;

    let validation = validate_submission(&submission);
    if !validation.is_valid {
        if validation.is_bot() {
            tracing::info!(client = %ip, "honeypot triggered");
        } else {
            tracing::info!(client = %ip, errors = ?validation.errors, "submission failed validation");
        }
        return Err(ContactError::Validation(validation.errors));
    }

    let Some(mail) = state.mail.as_ref() else {
        return Err(ContactError::NotConfigured);
    };

    let start_time = Instant::now();

    let notification = notification_email(&mail.settings, &submission);
    mail.mailer.send(notification).await?;
    EMAILS_SENT.with_label_values(&["notification"]).inc();

    if let Some(thank_you) = thank_you_email(&mail.settings, &submission) {
        mail.mailer.send(thank_you).await?;
        EMAILS_SENT.with_label_values(&["thank_you"]).inc();
    }

    SUBMISSION_LATENCY.observe(start_time.elapsed().as_secs_f64());
    tracing::info!(client = %ip, "contact submission delivered");

    Ok(ContactResponse::success())
}
