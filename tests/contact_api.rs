//! Router-level tests for POST /api/contact, with a recording mailer standing
//! in for SMTP.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use contact_gateway::{
    AppState, MailService, create_router,
    config::MailSettings,
    mailer::{MailError, Mailer, OutgoingEmail},
    rate_limit::{RateLimitPolicy, RateLimiter},
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".to_string()))
    }
}

fn mail_settings() -> MailSettings {
    MailSettings {
        sender: "hello@agency.example".to_string(),
        recipient: "inbox@agency.example".to_string(),
        site_name: "Agency".to_string(),
    }
}

fn limiter() -> RateLimiter {
    RateLimiter::in_memory(RateLimitPolicy {
        max_requests: 5,
        window: Duration::from_secs(60),
    })
}

fn app_with(mailer: Option<Arc<dyn Mailer>>) -> Router {
    let mail = mailer.map(|mailer| MailService {
        mailer,
        settings: mail_settings(),
    });
    create_router(Arc::new(AppState::new(limiter(), mail)))
}

fn recording() -> Arc<dyn Mailer> {
    Arc::new(RecordingMailer::default())
}

fn valid_payload() -> Value {
    json!({
        "name": "John Smith",
        "email": "john@example.com",
        "message": "I would like to request a quote for your services."
    })
}

fn contact_request(
    ip: Option<&str>,
    body: impl Into<Body>,
) -> Result<Request<Body>, axum::http::Error> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(ip) = ip {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder.body(body.into())
}

async fn post(
    app: &Router,
    ip: Option<&str>,
    payload: &Value,
) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    let response = app
        .clone()
        .oneshot(contact_request(ip, payload.to_string())?)
        .await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn valid_submission_sends_both_emails() -> TestResult {
    let mailer = Arc::new(RecordingMailer::default());
    let app = app_with(Some(mailer.clone() as Arc<dyn Mailer>));

    let (status, body) = post(&app, Some("198.51.100.1"), &valid_payload()).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, "inbox@agency.example");
    assert_eq!(sent[0].reply_to.as_deref(), Some("john@example.com"));
    assert!(sent[0].text.contains("I would like to request a quote"));
    assert_eq!(sent[1].to, "john@example.com");
    assert!(sent[1].html.as_deref().unwrap_or("").contains("John Smith"));
    Ok(())
}

#[tokio::test]
async fn honeypot_returns_bot_detected_only() -> TestResult {
    let mailer = Arc::new(RecordingMailer::default());
    let app = app_with(Some(mailer.clone() as Arc<dyn Mailer>));

    let mut payload = valid_payload();
    payload["website"] = json!("http://spam.example");

    let (status, body) = post(&app, Some("198.51.100.2"), &payload).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["details"], json!(["Bot detected"]));
    assert!(mailer.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn non_string_honeypots_are_bots_not_bad_bodies() -> TestResult {
    let mailer = Arc::new(RecordingMailer::default());
    let app = app_with(Some(mailer.clone() as Arc<dyn Mailer>));

    for (i, (field, value)) in [("website", json!(1)), ("url_field", json!(true))]
        .into_iter()
        .enumerate()
    {
        let mut payload = valid_payload();
        payload[field] = value;

        let ip = format!("198.51.100.{}", 20 + i);
        let (status, body) = post(&app, Some(&ip), &payload).await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Validation failed"));
        assert_eq!(body["details"], json!(["Bot detected"]));
    }
    assert!(mailer.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn unsendable_address_is_a_validation_error() -> TestResult {
    let mailer = Arc::new(RecordingMailer::default());
    let app = app_with(Some(mailer.clone() as Arc<dyn Mailer>));

    let mut payload = valid_payload();
    payload["email"] = json!("a,b@example.com");

    let (status, body) = post(&app, Some("198.51.100.30"), &payload).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!(["Please provide a valid email address"]));
    assert!(mailer.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn validation_errors_are_listed() -> TestResult {
    let app = app_with(Some(recording()));

    let payload = json!({"name": "J", "email": "nope", "message": "short"});
    let (status, body) = post(&app, Some("198.51.100.3"), &payload).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Validation failed"));
    assert_eq!(
        body["details"],
        json!([
            "Name must be at least 2 characters long",
            "Please provide a valid email address",
            "Message must be at least 10 characters long"
        ])
    );
    Ok(())
}

#[tokio::test]
async fn spam_message_is_rejected() -> TestResult {
    let app = app_with(Some(recording()));

    let mut payload = valid_payload();
    payload["message"] = json!("Amazing deal, click here to find out more");

    let (status, body) = post(&app, Some("198.51.100.4"), &payload).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = body["details"].as_array().ok_or("details should be an array")?;
    assert!(details.contains(&json!("Spam content detected in message")));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> TestResult {
    let app = app_with(Some(recording()));

    let response = app
        .oneshot(contact_request(Some("198.51.100.5"), "{not json")?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body, json!({"ok": false, "error": "Invalid request body"}));
    Ok(())
}

#[tokio::test]
async fn sixth_request_from_same_ip_is_rate_limited() -> TestResult {
    let app = app_with(Some(recording()));

    for _ in 0..5 {
        let (status, _) = post(&app, Some("203.0.113.9"), &valid_payload()).await?;
        assert_eq!(status, StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(contact_request(Some("203.0.113.9"), valid_payload().to_string())?)
        .await?;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    // a different client is unaffected
    let (status, _) = post(&app, Some("203.0.113.10"), &valid_payload()).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn rate_limit_counts_invalid_submissions_too() -> TestResult {
    let app = app_with(Some(recording()));
    let junk = json!({"name": "", "email": "", "message": ""});

    for _ in 0..5 {
        let (status, _) = post(&app, Some("203.0.113.20"), &junk).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    let (status, body) = post(&app, Some("203.0.113.20"), &valid_payload()).await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["ok"], json!(false));
    Ok(())
}

#[tokio::test]
async fn clients_without_proxy_headers_share_a_bucket() -> TestResult {
    let app = app_with(Some(recording()));

    for _ in 0..5 {
        post(&app, None, &valid_payload()).await?;
    }
    let (status, _) = post(&app, None, &valid_payload()).await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    Ok(())
}

#[tokio::test]
async fn missing_mail_config_is_a_server_error() -> TestResult {
    let app = app_with(None);

    let (status, body) = post(&app, Some("198.51.100.6"), &valid_payload()).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"ok": false, "error": "Email service is not configured"})
    );
    Ok(())
}

#[tokio::test]
async fn send_failure_surfaces_the_transport_error() -> TestResult {
    let app = app_with(Some(Arc::new(FailingMailer) as Arc<dyn Mailer>));

    let (status, body) = post(&app, Some("198.51.100.7"), &valid_payload()).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], json!("SMTP transport error: connection refused"));
    Ok(())
}

#[tokio::test]
async fn health_and_metrics_respond() -> TestResult {
    let app = app_with(None);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["status"], json!("healthy"));

    // make sure at least one contact metric has been touched
    post(&app, Some("198.51.100.8"), &valid_payload()).await?;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await?.to_bytes();
    let text = String::from_utf8(bytes.to_vec())?;
    assert!(text.contains("contact_submissions_total"));
    Ok(())
}
