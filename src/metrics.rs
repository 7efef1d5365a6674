use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, TextEncoder, register_counter,
    register_counter_vec, register_gauge, register_histogram,
};

lazy_static! {
    pub static ref SUBMISSIONS_TOTAL: Counter =
        register_counter!("contact_submissions_total", "Total contact form submissions").unwrap();
    pub static ref SUBMISSIONS_REJECTED: CounterVec = register_counter_vec!(
        "contact_submissions_rejected_total",
        "Rejected contact form submissions by reason",
        &["reason"]
    )
    .unwrap();
    pub static ref EMAILS_SENT: CounterVec = register_counter_vec!(
        "contact_emails_sent_total",
        "Emails sent by kind",
        &["kind"]
    )
    .unwrap();
    pub static ref SUBMISSION_LATENCY: Histogram = register_histogram!(
        "contact_submission_latency_seconds",
        "Time to process an accepted submission, including SMTP"
    )
    .unwrap();
    pub static ref RATE_LIMIT_KEYS: Gauge =
        register_gauge!("contact_rate_limit_keys", "Client keys currently tracked by the rate limiter").unwrap();
}

// Render every registered metric in the Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
