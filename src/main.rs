use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use contact_gateway::{
    AppState, Args, MailService, create_router,
    logging::init_logging,
    mailer::SmtpMailer,
    rate_limit::{RateLimitPolicy, RateLimiter, sweeper},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // parse cli arguments
    let args = Args::parse();
    init_logging();

    let rate_limiter = RateLimiter::in_memory(RateLimitPolicy {
        max_requests: args.rate_limit,
        window: args.rate_window(),
    });

    // spawn the sweeper for finished rate limit windows
    let sweep_interval = Duration::from_secs(args.rate_sweep_interval.max(1));
    tokio::spawn(sweeper(rate_limiter.store(), sweep_interval));

    let mail = match (args.smtp_settings(), args.mail_settings()) {
        (Some(smtp), Some(settings)) => {
            let mailer = SmtpMailer::new(&smtp)?;
            tracing::info!(
                host = %smtp.host,
                port = smtp.port,
                security = ?smtp.security,
                recipient = %settings.recipient,
                "SMTP mailer configured"
            );
            Some(MailService {
                mailer: Arc::new(mailer),
                settings,
            })
        }
        _ => {
            tracing::warn!(
                "SMTP_HOST, SMTP_USER, SMTP_PASS or SENDER_EMAIL missing; contact submissions will fail"
            );
            None
        }
    };

    let state = Arc::new(AppState::new(rate_limiter, mail));
    let app = create_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "contact gateway listening");
    tracing::info!(
        "Rate limit: {} submissions per {} seconds",
        args.rate_limit,
        args.rate_window
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("contact gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
