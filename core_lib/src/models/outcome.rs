//! Uniform submission result and per-submission receipt

use crate::validation::FieldErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const INVALID_FORM_MESSAGE: &str = "Please correct the highlighted fields.";

/// What the caller gets back for every submission: `success` plus a message
/// that is never empty. Field errors are present only when validation failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl SubmissionOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }

    pub fn rejected(errors: FieldErrors) -> Self {
        Self {
            success: false,
            message: INVALID_FORM_MESSAGE.to_string(),
            errors: Some(errors),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.errors.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Contact,
    Story,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Contact => "contact",
            SubmissionKind::Story => "story",
        }
    }
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stamped onto an accepted record right before its effect runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub id: Uuid,
    pub kind: SubmissionKind,
    pub received_at: DateTime<Utc>,
}

impl SubmissionReceipt {
    pub fn new(kind: SubmissionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            received_at: Utc::now(),
        }
    }
}
