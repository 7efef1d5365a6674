use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::interval;

use crate::metrics::RATE_LIMIT_KEYS;

// Bucket shared by every client that arrives without proxy headers
pub const UNKNOWN_CLIENT: &str = "unknown";

// Rate limit entry - tracks submissions per client key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    // Whole seconds until the window resets, at least 1
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        let secs = (self.reset_at - now).num_seconds();
        u64::try_from(secs).unwrap_or(0).max(1)
    }
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limit store unavailable: {0}")]
    Unavailable(String),
}

impl RateLimitPolicy {
    fn window_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.window).unwrap_or_else(|_| TimeDelta::days(365))
    }
}

impl RateLimitEntry {
    pub fn new(now: DateTime<Utc>, policy: &RateLimitPolicy) -> Self {
        Self {
            count: 1,
            reset_at: now + policy.window_delta(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.reset_at
    }

    // Fixed window: restart once the window has passed, otherwise count up
    // to the limit and refuse without counting past it
    pub fn register(&mut self, now: DateTime<Utc>, policy: &RateLimitPolicy) -> RateLimitDecision {
        let allowed = if self.is_expired(now) {
            *self = Self::new(now, policy);
            true
        } else if self.count >= policy.max_requests {
            false
        } else {
            self.count += 1;
            true
        };

        RateLimitDecision {
            allowed,
            remaining: policy.max_requests.saturating_sub(self.count),
            reset_at: self.reset_at,
        }
    }
}

/// Storage for rate limit windows.
///
/// `hit` must apply the window update for a key atomically. The in-memory
/// store gets that from `DashMap` entry locking; a shared backend has to do
/// the same on its side.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision, RateLimitError>;

    // Drop windows that have already ended, returns how many went
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, RateLimitError>;
}

// Process-local store. Not shared across instances.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision, RateLimitError> {
        let decision = {
            let mut entry = self
                .entries
                .entry(key.to_string())
                .or_insert(RateLimitEntry {
                    count: 0,
                    reset_at: now + policy.window_delta(),
                });
            entry.register(now, policy)
        };
        RATE_LIMIT_KEYS.set(self.entries.len() as f64);
        Ok(decision)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, RateLimitError> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let after = self.entries.len();
        RATE_LIMIT_KEYS.set(after as f64);
        Ok(before.saturating_sub(after))
    }
}

pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn in_memory(policy: RateLimitPolicy) -> Self {
        Self::new(Arc::new(MemoryStore::new()), policy)
    }

    pub fn store(&self) -> Arc<dyn RateLimitStore> {
        Arc::clone(&self.store)
    }

    // A failing store lets the request through rather than blocking the form
    pub async fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        match self.store.hit(key, &self.policy, now).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(error = %e, key, "rate limit store failed, allowing request");
                RateLimitDecision {
                    allowed: true,
                    remaining: self.policy.max_requests,
                    reset_at: now + self.policy.window_delta(),
                }
            }
        }
    }
}

// Client key from proxy headers: first X-Forwarded-For hop, then X-Real-IP
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

// Periodically evicts finished windows so the store doesn't grow forever
pub async fn sweeper(store: Arc<dyn RateLimitStore>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    tracing::info!(?sweep_interval, "rate limit sweeper started");

    loop {
        interval.tick().await;

        match store.purge_expired(Utc::now()).await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "evicted expired rate limit windows"),
            Err(e) => tracing::warn!(error = %e, "rate limit sweep failed"),
        }
    }
}
