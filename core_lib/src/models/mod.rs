//! Form request and submission models

pub mod contact;
pub mod outcome;
pub mod story;

pub use contact::{ContactRequest, ContactSubmission};
pub use outcome::{SubmissionKind, SubmissionOutcome, SubmissionReceipt};
pub use story::{StoryRequest, StorySubmission, STORY_MIN_LENGTH};
