//! External effect seams and their logging implementations

use crate::models::{ContactSubmission, StorySubmission, SubmissionReceipt};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum EffectError {
    #[error("effect unavailable: {0}")]
    Unavailable(String),

    #[error("effect rejected the submission: {0}")]
    Rejected(String),

    #[error("effect timed out after {0:?}")]
    TimedOut(Duration),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for EffectError {
    fn from(err: sqlx::Error) -> Self {
        EffectError::Database(err.to_string())
    }
}

/// Delivers a contact message to whoever answers them (email service,
/// inbox table, webhook).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, receipt: &SubmissionReceipt, submission: &ContactSubmission) -> Result<(), EffectError>;

    fn name(&self) -> &'static str;
}

/// Keeps a shared story for later review and publication.
#[async_trait]
pub trait StoryStorage: Send + Sync {
    async fn store(&self, receipt: &SubmissionReceipt, submission: &StorySubmission) -> Result<(), EffectError>;

    fn name(&self) -> &'static str;
}

/// Logs the message and waits out a simulated delivery latency.
#[derive(Debug, Clone)]
pub struct LoggingNotifier {
    latency: Duration,
}

impl LoggingNotifier {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for LoggingNotifier {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, receipt: &SubmissionReceipt, submission: &ContactSubmission) -> Result<(), EffectError> {
        info!(
            submission_id = %receipt.id,
            full_name = %submission.full_name,
            email = %submission.email,
            country = %submission.country,
            city = %submission.city,
            subject = %submission.subject,
            message_chars = submission.message.chars().count(),
            "Contact form submission"
        );

        tokio::time::sleep(self.latency).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Logs the story and waits out a simulated storage latency.
#[derive(Debug, Clone)]
pub struct LoggingStoryStorage {
    latency: Duration,
}

impl LoggingStoryStorage {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for LoggingStoryStorage {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[async_trait]
impl StoryStorage for LoggingStoryStorage {
    async fn store(&self, receipt: &SubmissionReceipt, submission: &StorySubmission) -> Result<(), EffectError> {
        info!(
            submission_id = %receipt.id,
            author = submission.name.as_deref().unwrap_or("anonymous"),
            has_email = submission.email.is_some(),
            story_chars = submission.story.chars().count(),
            "Story submission"
        );

        tokio::time::sleep(self.latency).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionKind;

    #[tokio::test]
    async fn test_logging_effects_succeed() {
        let contact = ContactSubmission {
            full_name: "Al".to_string(),
            email: "a@b.com".to_string(),
            country: "US".to_string(),
            city: "NY".to_string(),
            subject: "Hello there".to_string(),
            message: "This message is definitely twenty chars.".to_string(),
        };
        let story = StorySubmission {
            name: None,
            email: None,
            story: "s".repeat(60),
        };

        let notifier = LoggingNotifier::new(Duration::from_millis(1));
        let storage = LoggingStoryStorage::new(Duration::from_millis(1));

        assert!(notifier
            .notify(&SubmissionReceipt::new(SubmissionKind::Contact), &contact)
            .await
            .is_ok());
        assert!(storage
            .store(&SubmissionReceipt::new(SubmissionKind::Story), &story)
            .await
            .is_ok());
        assert_eq!(notifier.name(), "log");
    }

    #[test]
    fn test_effect_error_messages() {
        assert_eq!(
            EffectError::TimedOut(Duration::from_millis(250)).to_string(),
            "effect timed out after 250ms"
        );
        assert!(matches!(EffectError::from(sqlx::Error::PoolClosed), EffectError::Database(_)));
    }
}
