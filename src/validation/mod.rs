//! Contact form validation.
//!
//! [`validate_submission`] is a pure function over the parsed payload. It
//! collects every problem it finds rather than stopping at the first, except
//! for the honeypot check which short-circuits. The spam and gibberish checks
//! are heuristics and will let some junk through.

mod gibberish;
mod spam;

pub use gibberish::{FieldKind, is_gibberish};
pub use spam::{SPAM_KEYWORDS, contains_spam};

use lazy_static::lazy_static;
use lettre::Address;
use lettre::message::Mailbox;
use regex::Regex;

use crate::models::ContactSubmission;

pub const BOT_DETECTED: &str = "Bot detected";

const MIN_NAME_LEN: usize = 2;
const MIN_MESSAGE_LEN: usize = 10;
const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const MAX_COMPANY_LEN: usize = 200;
const MAX_SUBJECT_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 5000;

lazy_static! {
    static ref EMAIL_SHAPE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_bot(&self) -> bool {
        self.errors.len() == 1 && self.errors[0] == BOT_DETECTED
    }
}

// The address also has to parse as a lettre mailbox, since it becomes the
// notification's Reply-To
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    EMAIL_SHAPE.is_match(email)
        && email.parse::<Address>().is_ok()
        && email.parse::<Mailbox>().is_ok()
}

pub fn validate_submission(submission: &ContactSubmission) -> ValidationResult {
    if submission.honeypot_triggered() {
        return ValidationResult::from_errors(vec![BOT_DETECTED.to_string()]);
    }

    let mut errors = Vec::new();

    let name = submission.name().trim();
    let email = submission.email().trim();
    let message = submission.message().trim();
    let company = submission.company().trim();
    let subject = submission.subject().trim();

    // required fields
    if name.chars().count() < MIN_NAME_LEN {
        errors.push("Name must be at least 2 characters long".to_string());
    }
    if !is_valid_email(email) {
        errors.push("Please provide a valid email address".to_string());
    }
    if message.chars().count() < MIN_MESSAGE_LEN {
        errors.push("Message must be at least 10 characters long".to_string());
    }

    // upper bounds
    let limits = [
        ("Name", name, MAX_NAME_LEN),
        ("Email", email, MAX_EMAIL_LEN),
        ("Company", company, MAX_COMPANY_LEN),
        ("Subject", subject, MAX_SUBJECT_LEN),
        ("Message", message, MAX_MESSAGE_LEN),
    ];
    for (label, value, max) in limits {
        if value.chars().count() > max {
            errors.push(format!("{label} must be at most {max} characters long"));
        }
    }

    // spam keywords
    let spam_checked = [
        ("name", name),
        ("company", company),
        ("subject", subject),
        ("message", message),
    ];
    for (field, value) in spam_checked {
        if !value.is_empty() && contains_spam(value) {
            errors.push(format!("Spam content detected in {field}"));
        }
    }

    // gibberish
    if is_gibberish(name, FieldKind::Name) {
        errors.push("Name appears to be gibberish or invalid".to_string());
    }
    if is_gibberish(company, FieldKind::Company) {
        errors.push("Company name appears to be gibberish or invalid".to_string());
    }
    if is_gibberish(message, FieldKind::Message) {
        errors.push("Message appears to be gibberish".to_string());
    }

    ValidationResult::from_errors(errors)
}
