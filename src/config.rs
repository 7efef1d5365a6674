use clap::{Parser, ValueEnum};
use std::time::Duration;

// CLI argument structure, every option can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "contact-gateway")]
#[command(about = "Contact form backend for the agency website")]
pub struct Args {
    // Address to bind
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Rate limit max submissions per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 5)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // How often expired rate limit records are swept, in seconds
    #[arg(long, env = "RATE_SWEEP_INTERVAL", default_value_t = 300)]
    pub rate_sweep_interval: u64,

    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    // Defaults to 587, or 465 for implicit TLS
    #[arg(long, env = "SMTP_PORT")]
    pub smtp_port: Option<u16>,

    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    pub smtp_pass: Option<String>,

    #[arg(long, env = "SMTP_SECURITY", value_enum, default_value_t = SmtpSecurity::Auto)]
    pub smtp_security: SmtpSecurity,

    // SMTP command timeout in seconds
    #[arg(long, env = "SMTP_TIMEOUT", default_value_t = 15)]
    pub smtp_timeout: u64,

    // Address the emails are sent from
    #[arg(long, env = "SENDER_EMAIL")]
    pub sender_email: Option<String>,

    // Agency inbox, falls back to the sender address
    #[arg(long, env = "CONTACT_TO_EMAIL")]
    pub contact_to_email: Option<String>,

    // Name used in email subjects and the thank-you template
    #[arg(long, env = "SITE_NAME", default_value = "Our Team")]
    pub site_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SmtpSecurity {
    // Implicit TLS on 465, STARTTLS everywhere else
    Auto,
    Tls,
    Starttls,
    // Plaintext, local relays and test catchers only
    #[value(name = "none")]
    Plain,
}

// Everything needed to talk to the SMTP relay
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub security: SmtpSecurity,
    pub timeout: Duration,
}

// Addresses and branding for outgoing mail
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub sender: String,
    pub recipient: String,
    pub site_name: String,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    // Returns None when any required SMTP value is missing or blank
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        let host = non_blank(&self.smtp_host)?;
        let username = non_blank(&self.smtp_user)?;
        let password = non_blank(&self.smtp_pass)?;

        let security = match self.smtp_security {
            SmtpSecurity::Auto if self.smtp_port == Some(465) => SmtpSecurity::Tls,
            SmtpSecurity::Auto => SmtpSecurity::Starttls,
            other => other,
        };
        let port = self.smtp_port.unwrap_or(match security {
            SmtpSecurity::Tls => 465,
            SmtpSecurity::Plain => 25,
            _ => 587,
        });

        Some(SmtpSettings {
            host,
            port,
            username,
            password,
            security,
            timeout: Duration::from_secs(self.smtp_timeout),
        })
    }

    pub fn mail_settings(&self) -> Option<MailSettings> {
        let sender = non_blank(&self.sender_email)?;
        let recipient = non_blank(&self.contact_to_email).unwrap_or_else(|| sender.clone());

        Some(MailSettings {
            sender,
            recipient,
            site_name: self.site_name.clone(),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
