//! Field rules shared by the form schemas

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use validator::ValidationError;

pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MAX_EMAIL_LENGTH: usize = 254;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$"
    ).unwrap();
}

/// Rules are checked by hand instead of `#[derive(Validate)]` because each
/// side of the range has its own message and input is trimmed first.
///
/// Inclusive length bounds for a text field, counted in characters, with the
/// message shown for each side of the range.
#[derive(Debug, Clone, Copy)]
pub struct LengthRule {
    pub min: usize,
    pub max: usize,
    pub too_short: &'static str,
    pub too_long: &'static str,
}

impl LengthRule {
    pub const fn between(min: usize, max: usize, too_short: &'static str, too_long: &'static str) -> Self {
        Self { min, max, too_short, too_long }
    }

    pub const fn at_most(max: usize, too_long: &'static str) -> Self {
        Self { min: 0, max, too_short: too_long, too_long }
    }

    pub fn check(&self, value: &str) -> Result<(), ValidationError> {
        let length = value.chars().count();

        if length < self.min {
            return Err(rule_error("length_min", self.too_short));
        }

        if length > self.max {
            return Err(rule_error("length_max", self.too_long));
        }

        Ok(())
    }
}

/// The local part may not start with a dot and no two dots may be adjacent
/// anywhere; the regex crate has no lookahead, so those are checked here.
pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if email.is_empty()
        || email.len() > MAX_EMAIL_LENGTH
        || email.starts_with('.')
        || email.contains("..")
        || !EMAIL_REGEX.is_match(email)
    {
        return Err(rule_error("email", INVALID_EMAIL));
    }

    Ok(())
}

/// Empty input counts as "not provided" and passes.
pub fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Ok(());
    }

    validate_email_format(email)
}

pub fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}
