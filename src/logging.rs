//! Tracing setup.
//!
//! `RUST_LOG` takes precedence over the default filter.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "contact_gateway=info";

pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true));

    // ignore the error if a subscriber is already installed
    let _ = subscriber.try_init();
}
