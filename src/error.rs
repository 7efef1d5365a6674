use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::mailer::MailError;
use crate::models::ContactResponse;

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after: u64 },

    #[error("Invalid request body")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Email service is not configured")]
    NotConfigured,

    #[error(transparent)]
    Mail(#[from] MailError),
}

impl ContactError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContactError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ContactError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ContactError::Validation(_) => StatusCode::BAD_REQUEST,
            ContactError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ContactError::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Label for the rejection counter
    pub fn reason(&self) -> &'static str {
        match self {
            ContactError::RateLimited { .. } => "rate_limited",
            ContactError::InvalidBody(_) => "invalid_body",
            ContactError::Validation(_) => "invalid",
            ContactError::NotConfigured => "not_configured",
            ContactError::Mail(_) => "send_failed",
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ContactError::NotConfigured | ContactError::Mail(_) => {
                tracing::error!(error = %self, "contact submission failed");
            }
            _ => tracing::debug!(error = %self, "contact submission rejected"),
        }

        let body = match &self {
            ContactError::Validation(details) => {
                ContactResponse::failure(self.to_string()).with_details(details.clone())
            }
            _ => ContactResponse::failure(self.to_string()),
        };

        let mut response = (status, Json(body)).into_response();
        if let ContactError::RateLimited { retry_after } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
