use lazy_static::lazy_static;
use regex::Regex;

// Phrases that only show up in junk submissions. Matched as whole words,
// case-insensitively. Nothing an agency lead would normally write goes here.
pub const SPAM_KEYWORDS: &[&str] = &[
    "viagra",
    "cialis",
    "casino",
    "lottery",
    "jackpot",
    "crypto",
    "cryptocurrency",
    "bitcoin",
    "forex",
    "click here",
    "buy now",
    "order now",
    "act now",
    "limited time offer",
    "free money",
    "make money fast",
    "earn cash",
    "extra income",
    "work from home",
    "double your",
    "100% free",
    "risk-free",
    "no credit check",
    "payday loan",
    "investment opportunity",
    "congratulations you won",
    "you have been selected",
    "wire transfer",
    "weight loss",
    "adult content",
];

lazy_static! {
    static ref SPAM_PATTERN: Regex = {
        let alternation = SPAM_KEYWORDS
            .iter()
            .map(|keyword| regex::escape(keyword))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap()
    };
}

pub fn contains_spam(text: &str) -> bool {
    SPAM_PATTERN.is_match(text)
}
