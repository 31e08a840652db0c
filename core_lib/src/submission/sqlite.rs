//! SQLite-backed effects: an inbox for contact messages and a review queue
//! for shared stories

use super::effects::{EffectError, Notifier, StoryStorage};
use crate::models::{ContactSubmission, StorySubmission, SubmissionReceipt};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    PendingReview,
    Approved,
    Rejected,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::PendingReview => "pending_review",
            StoryStatus::Approved => "approved",
            StoryStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending_review" => Some(StoryStatus::PendingReview),
            "approved" => Some(StoryStatus::Approved),
            "rejected" => Some(StoryStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredStory {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub story: String,
    pub status: StoryStatus,
    pub received_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SqliteInbox {
    pool: SqlitePool,
}

impl SqliteInbox {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn contact_message_count(&self) -> Result<i64, EffectError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM contact_messages")
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    pub async fn stories_by_status(&self, status: StoryStatus) -> Result<Vec<StoredStory>, EffectError> {
        let rows = sqlx::query(r#"
            SELECT id, name, email, story, status, received_at
            FROM stories
            WHERE status = ?
            ORDER BY received_at
        "#)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<StoredStory, EffectError> {
                let status: String = row.try_get("status")?;
                Ok(StoredStory {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    story: row.try_get("story")?,
                    status: StoryStatus::parse(&status)
                        .ok_or_else(|| EffectError::Database(format!("unknown story status '{}'", status)))?,
                    received_at: row.try_get("received_at")?,
                })
            })
            .collect()
    }

    /// Moves a story through review. Returns false when no story has that id.
    pub async fn set_story_status(&self, id: &str, status: StoryStatus) -> Result<bool, EffectError> {
        let result = sqlx::query("UPDATE stories SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Notifier for SqliteInbox {
    async fn notify(&self, receipt: &SubmissionReceipt, submission: &ContactSubmission) -> Result<(), EffectError> {
        sqlx::query(r#"
            INSERT INTO contact_messages (id, full_name, email, country, city, subject, message, received_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#)
        .bind(receipt.id.to_string())
        .bind(&submission.full_name)
        .bind(&submission.email)
        .bind(&submission.country)
        .bind(&submission.city)
        .bind(&submission.subject)
        .bind(&submission.message)
        .bind(receipt.received_at)
        .execute(&self.pool)
        .await?;

        debug!(submission_id = %receipt.id, "Contact message stored in inbox");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

#[async_trait]
impl StoryStorage for SqliteInbox {
    async fn store(&self, receipt: &SubmissionReceipt, submission: &StorySubmission) -> Result<(), EffectError> {
        sqlx::query(r#"
            INSERT INTO stories (id, name, email, story, status, received_at)
            VALUES (?, ?, ?, ?, ?, ?)
        "#)
        .bind(receipt.id.to_string())
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.story)
        .bind(StoryStatus::PendingReview.as_str())
        .bind(receipt.received_at)
        .execute(&self.pool)
        .await?;

        debug!(submission_id = %receipt.id, "Story queued for review");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{get_database_pool, run_migrations};
    use crate::models::SubmissionKind;
    use tempfile::TempDir;

    async fn inbox() -> (TempDir, SqliteInbox) {
        let dir = TempDir::new().unwrap();
        let database_url = format!("sqlite:{}", dir.path().join("forms.db").display());
        let pool = get_database_pool(&database_url, 2).await.unwrap();
        run_migrations(pool.clone()).await.unwrap();
        (dir, SqliteInbox::new(pool))
    }

    #[tokio::test]
    async fn test_contact_messages_are_persisted() {
        let (_dir, inbox) = inbox().await;
        let submission = ContactSubmission {
            full_name: "Al".to_string(),
            email: "a@b.com".to_string(),
            country: "US".to_string(),
            city: "NY".to_string(),
            subject: "Hello there".to_string(),
            message: "This message is definitely twenty chars.".to_string(),
        };

        inbox
            .notify(&SubmissionReceipt::new(SubmissionKind::Contact), &submission)
            .await
            .unwrap();
        inbox
            .notify(&SubmissionReceipt::new(SubmissionKind::Contact), &submission)
            .await
            .unwrap();

        assert_eq!(inbox.contact_message_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stories_start_pending_and_can_be_approved() {
        let (_dir, inbox) = inbox().await;
        let receipt = SubmissionReceipt::new(SubmissionKind::Story);
        let submission = StorySubmission {
            name: None,
            email: Some("reader@example.org".to_string()),
            story: "s".repeat(80),
        };

        inbox.store(&receipt, &submission).await.unwrap();

        let pending = inbox.stories_by_status(StoryStatus::PendingReview).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, receipt.id.to_string());
        assert_eq!(pending[0].name, None);
        assert_eq!(pending[0].email.as_deref(), Some("reader@example.org"));

        assert!(inbox.set_story_status(&pending[0].id, StoryStatus::Approved).await.unwrap());
        assert!(!inbox.set_story_status("missing", StoryStatus::Rejected).await.unwrap());

        assert!(inbox.stories_by_status(StoryStatus::PendingReview).await.unwrap().is_empty());
        assert_eq!(inbox.stories_by_status(StoryStatus::Approved).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_tables_surface_as_effect_errors() {
        let dir = TempDir::new().unwrap();
        let database_url = format!("sqlite:{}", dir.path().join("empty.db").display());
        let inbox = SqliteInbox::new(get_database_pool(&database_url, 1).await.unwrap());

        let result = inbox.contact_message_count().await;
        assert!(matches!(result, Err(EffectError::Database(_))));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [StoryStatus::PendingReview, StoryStatus::Approved, StoryStatus::Rejected] {
            assert_eq!(StoryStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(StoryStatus::parse("published"), None);
    }
}
