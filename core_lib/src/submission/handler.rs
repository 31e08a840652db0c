//! Runs the external effect for a validated form and reports the outcome

use super::effects::{EffectError, LoggingNotifier, LoggingStoryStorage, Notifier, StoryStorage};
use crate::models::{
    ContactRequest, ContactSubmission, StoryRequest, StorySubmission, SubmissionKind,
    SubmissionOutcome, SubmissionReceipt,
};
use crate::validation::FormSchema;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{error, info, warn};

pub const CONTACT_SUCCESS_MESSAGE: &str = "Thank you for reaching out. Your message has been received.";
pub const CONTACT_FAILURE_MESSAGE: &str = "Failed to send message. Please try again.";
pub const STORY_SUCCESS_MESSAGE: &str = "Thank you for sharing. Your story inspires others to care.";
pub const STORY_FAILURE_MESSAGE: &str = "Failed to submit story. Please try again.";

/// Every call makes exactly one attempt at its effect. Effect failures,
/// panics and timeouts are logged here and never reach the caller.
#[derive(Clone)]
pub struct SubmissionHandler {
    notifier: Arc<dyn Notifier>,
    stories: Arc<dyn StoryStorage>,
    effect_timeout: Option<Duration>,
}

impl SubmissionHandler {
    pub fn new(notifier: Arc<dyn Notifier>, stories: Arc<dyn StoryStorage>) -> Self {
        Self {
            notifier,
            stories,
            effect_timeout: None,
        }
    }

    pub fn logging(latency: Duration) -> Self {
        Self::new(
            Arc::new(LoggingNotifier::new(latency)),
            Arc::new(LoggingStoryStorage::new(latency)),
        )
    }

    pub fn with_effect_timeout(mut self, timeout: Duration) -> Self {
        self.effect_timeout = Some(timeout);
        self
    }

    pub fn effect_timeout(&self) -> Option<Duration> {
        self.effect_timeout
    }

    pub fn notifier_name(&self) -> &'static str {
        self.notifier.name()
    }

    pub fn storage_name(&self) -> &'static str {
        self.stories.name()
    }

    /// Validates the raw contact form, then delivers it.
    pub async fn submit_contact_form(&self, request: &ContactRequest) -> SubmissionOutcome {
        match request.validate_form() {
            Ok(submission) => self.submit_contact(submission).await,
            Err(errors) => {
                warn!(
                    kind = %SubmissionKind::Contact,
                    fields = ?errors.fields().collect::<Vec<_>>(),
                    "Contact form rejected"
                );
                SubmissionOutcome::rejected(errors)
            }
        }
    }

    /// Validates the raw story form, then stores it.
    pub async fn submit_story_form(&self, request: &StoryRequest) -> SubmissionOutcome {
        match request.validate_form() {
            Ok(submission) => self.submit_story(submission).await,
            Err(errors) => {
                warn!(
                    kind = %SubmissionKind::Story,
                    fields = ?errors.fields().collect::<Vec<_>>(),
                    "Story submission rejected"
                );
                SubmissionOutcome::rejected(errors)
            }
        }
    }

    pub async fn submit_contact(&self, submission: ContactSubmission) -> SubmissionOutcome {
        let receipt = SubmissionReceipt::new(SubmissionKind::Contact);
        let notifier = Arc::clone(&self.notifier);

        let result = self
            .run_effect(async move { notifier.notify(&receipt, &submission).await })
            .await;

        match result {
            Ok(()) => {
                info!(submission_id = %receipt.id, kind = %receipt.kind, "Contact message delivered");
                SubmissionOutcome::succeeded(CONTACT_SUCCESS_MESSAGE)
            }
            Err(e) => {
                error!(submission_id = %receipt.id, kind = %receipt.kind, error = %e, "Contact form error");
                SubmissionOutcome::failed(CONTACT_FAILURE_MESSAGE)
            }
        }
    }

    pub async fn submit_story(&self, submission: StorySubmission) -> SubmissionOutcome {
        let receipt = SubmissionReceipt::new(SubmissionKind::Story);
        let stories = Arc::clone(&self.stories);

        let result = self
            .run_effect(async move { stories.store(&receipt, &submission).await })
            .await;

        match result {
            Ok(()) => {
                info!(submission_id = %receipt.id, kind = %receipt.kind, "Story stored");
                SubmissionOutcome::succeeded(STORY_SUCCESS_MESSAGE)
            }
            Err(e) => {
                error!(submission_id = %receipt.id, kind = %receipt.kind, error = %e, "Story submission error");
                SubmissionOutcome::failed(STORY_FAILURE_MESSAGE)
            }
        }
    }

    async fn run_effect<F>(&self, effect: F) -> Result<(), EffectError>
    where
        F: Future<Output = Result<(), EffectError>> + Send + 'static,
    {
        let mut task = tokio::spawn(effect);

        let joined = match self.effect_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    task.abort();
                    return Err(EffectError::TimedOut(limit));
                }
            },
            None => task.await,
        };

        joined.map_err(|e| EffectError::Unavailable(format!("effect task failed: {}", e)))?
    }
}

impl Default for SubmissionHandler {
    fn default() -> Self {
        Self::new(Arc::new(LoggingNotifier::default()), Arc::new(LoggingStoryStorage::default()))
    }
}
