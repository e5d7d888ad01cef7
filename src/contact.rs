//! Contact form validation and submission status.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const INVALID_FORM_MESSAGE: &str = "Please fix the errors above before submitting.";
pub const SUCCESS_MESSAGE: &str = "Thank you for your message! I'll get back to you soon.";
pub const FAILURE_MESSAGE: &str = "Sorry, there was an error sending your message. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Subject => "Subject",
            Self::Message => "Message",
        }
    }

    /// Inclusive trimmed character bounds; email is pattern-checked instead.
    fn length_bounds(self) -> Option<(usize, usize)> {
        match self {
            Self::Name => Some((2, 50)),
            Self::Email => None,
            Self::Subject => Some((5, 100)),
            Self::Message => Some((10, 1_000)),
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Email => 1,
            Self::Subject => 2,
            Self::Message => 3,
        }
    }
}

/// First failing rule for `value`, or `None` when the field is valid.
pub fn validate_field(field: Field, value: &str) -> Option<String> {
    let label = field.label();
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Some(format!("{label} is required"));
    }

    match field.length_bounds() {
        Some((min, max)) => {
            let length = trimmed.chars().count();
            if length < min {
                Some(format!("{label} must be at least {min} characters"))
            } else if length > max {
                Some(format!("{label} must be less than {max} characters"))
            } else {
                None
            }
        }
        None if EMAIL_PATTERN.is_match(value) => None,
        None => Some("Please enter a valid email address".to_string()),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Submitting,
    Success,
    Failed(String),
}

impl SubmitStatus {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle | Self::Submitting => None,
            Self::Success => Some(SUCCESS_MESSAGE),
            Self::Failed(message) => Some(message),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("contact endpoint responded with status {0}")]
    Status(u16),
    #[error("contact submission failed: {0}")]
    Transport(String),
}

/// Field values, per-field errors and submission status of the form.
///
/// Fields are validated live once touched (blurred), and all at once on
/// submit. Any edit clears a finished submission back to `Idle`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactForm {
    values: ContactMessage,
    errors: [Option<String>; 4],
    touched: [bool; 4],
    status: SubmitStatus,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self {
            values: ContactMessage::default(),
            errors: Default::default(),
            touched: [false; 4],
            status: SubmitStatus::Idle,
        }
    }
}

impl ContactForm {
    pub fn values(&self) -> &ContactMessage {
        &self.values
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors[field.index()].as_deref()
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmitStatus::Submitting
    }

    pub fn edit(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();

        if self.touched[field.index()] {
            self.errors[field.index()] = validate_field(field, &value);
        }
        *self.values.value_mut(field) = value;

        if !matches!(self.status, SubmitStatus::Idle | SubmitStatus::Submitting) {
            self.status = SubmitStatus::Idle;
        }
    }

    pub fn blur(&mut self, field: Field) {
        self.touched[field.index()] = true;
        self.errors[field.index()] = validate_field(field, self.values.value(field));
    }

    /// Validates everything. On success moves to `Submitting` and returns the
    /// message to send; otherwise records the failure and returns `None`.
    pub fn begin_submit(&mut self) -> Option<ContactMessage> {
        if self.is_submitting() {
            return None;
        }

        self.touched = [true; 4];
        for field in Field::ALL {
            self.errors[field.index()] = validate_field(field, self.values.value(field));
        }

        if self.errors.iter().any(Option::is_some) {
            self.status = SubmitStatus::Failed(INVALID_FORM_MESSAGE.to_string());
            return None;
        }

        self.status = SubmitStatus::Submitting;
        Some(self.values.clone())
    }

    pub fn finish_submit(&mut self, outcome: Result<(), SubmitError>) {
        if !self.is_submitting() {
            return;
        }

        match outcome {
            Ok(()) => {
                *self = Self {
                    status: SubmitStatus::Success,
                    ..Self::default()
                };
            }
            Err(_) => self.status = SubmitStatus::Failed(FAILURE_MESSAGE.to_string()),
        }
    }
}

/// Posts the message as JSON when an endpoint is configured; otherwise
/// waits `delay` and succeeds.
#[cfg(target_arch = "wasm32")]
pub async fn submit(
    message: &ContactMessage,
    endpoint: Option<&url::Url>,
    delay: std::time::Duration,
    logger: crate::logging::Logger,
) -> Result<(), SubmitError> {
    logger.info(
        "contact_submit_start",
        serde_json::json!({ "endpoint_configured": endpoint.is_some() }),
    );

    let outcome = match endpoint {
        Some(endpoint) => post_message(message, endpoint).await,
        None => {
            gloo_timers::future::sleep(delay).await;
            Ok(())
        }
    };

    match &outcome {
        Ok(()) => logger.info("contact_submit_complete", serde_json::json!({})),
        Err(error) => logger.warn("contact_submit_failed", serde_json::json!({ "message": error.to_string() })),
    }

    outcome
}

#[cfg(target_arch = "wasm32")]
async fn post_message(message: &ContactMessage, endpoint: &url::Url) -> Result<(), SubmitError> {
    let response = gloo_net::http::Request::post(endpoint.as_str())
        .json(message)
        .map_err(|error| SubmitError::Transport(error.to_string()))?
        .send()
        .await
        .map_err(|error| SubmitError::Transport(error.to_string()))?;

    if response.ok() {
        Ok(())
    } else {
        Err(SubmitError::Status(response.status()))
    }
}
