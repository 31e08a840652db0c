//! Story ("Share a Story") form

use crate::validation::{collect, finish, non_blank, rules::*, text, FieldErrors, FormSchema};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Canonical minimum story length. The server schema's 50 is authoritative.
pub const STORY_MIN_LENGTH: usize = 50;

const NAME: LengthRule = LengthRule::at_most(100, "Name must be less than 100 characters");
const STORY: LengthRule = LengthRule::between(
    STORY_MIN_LENGTH,
    5000,
    "Story must be at least 50 characters",
    "Story must be less than 5000 characters",
);

/// Raw story form input. Name and email are optional; an empty email is the
/// same as no email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub story: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub story: String,
}

impl StorySubmission {
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

impl Validate for StoryRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        collect(&mut errors, "name", NAME.check(text(&self.name)));
        collect(&mut errors, "email", validate_optional_email(text(&self.email)));
        collect(&mut errors, "story", STORY.check(text(&self.story)));

        finish(errors)
    }
}

impl FormSchema for StoryRequest {
    type Valid = StorySubmission;

    fn validate_form(&self) -> Result<StorySubmission, FieldErrors> {
        self.validate()?;

        Ok(StorySubmission {
            name: non_blank(&self.name),
            email: non_blank(&self.email),
            story: text(&self.story).to_string(),
        })
    }
}
