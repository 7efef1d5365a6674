use std::sync::Arc;

use crate::config::MailSettings;
use crate::mailer::Mailer;
use crate::rate_limit::RateLimiter;

// Mail transport plus the addresses it sends from and to
#[derive(Clone)]
pub struct MailService {
    pub mailer: Arc<dyn Mailer>,
    pub settings: MailSettings,
}

// app's shared state
pub struct AppState {
    pub rate_limiter: RateLimiter,
    // None when SMTP credentials or the sender address are missing
    pub mail: Option<MailService>,
}

impl AppState {
    pub fn new(rate_limiter: RateLimiter, mail: Option<MailService>) -> Self {
        Self { rate_limiter, mail }
    }
}
