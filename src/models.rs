use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Contact form payload as posted by the site
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,

    // honeypots, real visitors never see or fill these in. Bots post
    // whatever type they like here, so accept any JSON value.
    #[serde(default)]
    pub website: Option<Value>,
    #[serde(default)]
    pub phone_number: Option<Value>,
    #[serde(default)]
    pub url_field: Option<Value>,

    // anything else the form sends along, forwarded in the notification
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContactSubmission {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    pub fn company(&self) -> &str {
        self.company.as_deref().unwrap_or("")
    }

    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }

    // Anything but absent, null or "" counts as filled in
    pub fn honeypot_triggered(&self) -> bool {
        [&self.website, &self.phone_number, &self.url_field]
            .iter()
            .any(|field| match field {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(_) => true,
            })
    }

    // Key/value pairs for the notification email, honeypots stripped and
    // empty values skipped
    pub fn display_fields(&self) -> Vec<(String, String)> {
        let known = [
            ("name", self.name()),
            ("email", self.email()),
            ("company", self.company()),
            ("subject", self.subject()),
            ("message", self.message()),
        ];

        let mut fields: Vec<(String, String)> = known
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(key, value)| (key.to_string(), value.trim().to_string()))
            .collect();

        for (key, value) in &self.extra {
            let rendered = match value {
                Value::Null => continue,
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            };
            if !rendered.is_empty() {
                fields.push((key.clone(), rendered));
            }
        }

        fields
    }
}

// Response body for every /api/contact outcome
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ContactResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ContactResponse {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
            details: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}
