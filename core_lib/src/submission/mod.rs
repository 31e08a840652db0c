//! Submission handling: one external effect per validated form

pub mod effects;
pub mod handler;
pub mod sqlite;

pub use effects::{EffectError, LoggingNotifier, LoggingStoryStorage, Notifier, StoryStorage};
pub use handler::{
    SubmissionHandler, CONTACT_FAILURE_MESSAGE, CONTACT_SUCCESS_MESSAGE, STORY_FAILURE_MESSAGE,
    STORY_SUCCESS_MESSAGE,
};
pub use sqlite::{SqliteInbox, StoredStory, StoryStatus};
