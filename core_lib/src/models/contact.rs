//! Contact ("Reach Out") form

use crate::validation::{collect, finish, rules::*, text, FieldErrors, FormSchema};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

const FULL_NAME: LengthRule = LengthRule::between(
    2,
    100,
    "Name must be at least 2 characters",
    "Name must be less than 100 characters",
);
const COUNTRY: LengthRule = LengthRule::between(2, 100, "Please enter your country", "Country name is too long");
const CITY: LengthRule = LengthRule::between(2, 100, "Please enter your city", "City name is too long");
const SUBJECT: LengthRule = LengthRule::between(
    5,
    200,
    "Subject must be at least 5 characters",
    "Subject must be less than 200 characters",
);
const MESSAGE: LengthRule = LengthRule::between(
    20,
    2000,
    "Message must be at least 20 characters",
    "Message must be less than 2000 characters",
);

/// Raw contact form input as posted by the site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A contact message that passed validation, with every field trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub full_name: String,
    pub email: String,
    pub country: String,
    pub city: String,
    pub subject: String,
    pub message: String,
}

impl Validate for ContactRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        collect(&mut errors, "fullName", FULL_NAME.check(text(&self.full_name)));
        collect(&mut errors, "email", validate_email_format(text(&self.email)));
        collect(&mut errors, "country", COUNTRY.check(text(&self.country)));
        collect(&mut errors, "city", CITY.check(text(&self.city)));
        collect(&mut errors, "subject", SUBJECT.check(text(&self.subject)));
        collect(&mut errors, "message", MESSAGE.check(text(&self.message)));

        finish(errors)
    }
}

impl FormSchema for ContactRequest {
    type Valid = ContactSubmission;

    fn validate_form(&self) -> Result<ContactSubmission, FieldErrors> {
        self.validate()?;

        Ok(ContactSubmission {
            full_name: text(&self.full_name).to_string(),
            email: text(&self.email).to_string(),
            country: text(&self.country).to_string(),
            city: text(&self.city).to_string(),
            subject: text(&self.subject).to_string(),
            message: text(&self.message).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ContactRequest {
        ContactRequest {
            full_name: Some("Al".to_string()),
            email: Some("a@b.com".to_string()),
            country: Some("US".to_string()),
            city: Some("NY".to_string()),
            subject: Some("Hello there".to_string()),
            message: Some("This message is definitely twenty chars.".to_string()),
        }
    }

    #[test]
    fn test_valid_contact_is_accepted() {
        let submission = valid_request().validate_form().unwrap();
        assert_eq!(submission.full_name, "Al");
        assert_eq!(submission.email, "a@b.com");
        assert_eq!(submission.city, "NY");
    }

    #[test]
    fn test_single_violation_reports_only_that_field() {
        let request = ContactRequest {
            full_name: Some("A".to_string()),
            ..valid_request()
        };

        let errors = request.validate_form().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("fullName"), Some("Name must be at least 2 characters"));
    }

    #[test]
    fn test_every_violation_is_reported() {
        let request = ContactRequest {
            full_name: Some("x".repeat(101)),
            email: Some("not-an-email".to_string()),
            country: Some("U".to_string()),
            city: None,
            subject: Some("Hi".to_string()),
            message: Some("Too short".to_string()),
        };

        let errors = request.validate_form().unwrap_err();
        assert_eq!(errors.len(), 6);
        assert_eq!(errors.get("fullName"), Some("Name must be less than 100 characters"));
        assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
        assert_eq!(errors.get("country"), Some("Please enter your country"));
        assert_eq!(errors.get("city"), Some("Please enter your city"));
        assert_eq!(errors.get("subject"), Some("Subject must be at least 5 characters"));
        assert_eq!(errors.get("message"), Some("Message must be at least 20 characters"));
    }

    #[test]
    fn test_empty_request_reports_all_fields() {
        let errors = ContactRequest::default().validate_form().unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["city", "country", "email", "fullName", "message", "subject"]);
    }

    #[test]
    fn test_upper_bounds() {
        let request = ContactRequest {
            country: Some("c".repeat(101)),
            subject: Some("s".repeat(201)),
            message: Some("m".repeat(2001)),
            ..valid_request()
        };

        let errors = request.validate_form().unwrap_err();
        assert_eq!(errors.get("country"), Some("Country name is too long"));
        assert_eq!(errors.get("subject"), Some("Subject must be less than 200 characters"));
        assert_eq!(errors.get("message"), Some("Message must be less than 2000 characters"));
        assert!(!errors.contains("fullName"));

        let at_limit = ContactRequest {
            message: Some("m".repeat(2000)),
            ..valid_request()
        };
        assert!(at_limit.validate_form().is_ok());
    }

    #[test]
    fn test_whitespace_is_trimmed_before_checks() {
        let padded = ContactRequest {
            full_name: Some("  Amina Rahman  ".to_string()),
            city: Some(" Sylhet\n".to_string()),
            ..valid_request()
        };
        let submission = padded.validate_form().unwrap();
        assert_eq!(submission.full_name, "Amina Rahman");
        assert_eq!(submission.city, "Sylhet");

        let blank_name = ContactRequest {
            full_name: Some("   A   ".to_string()),
            ..valid_request()
        };
        assert!(blank_name.validate_form().unwrap_err().contains("fullName"));
    }

    #[test]
    fn test_validation_is_repeatable() {
        let request = ContactRequest {
            email: Some("broken@".to_string()),
            ..valid_request()
        };
        assert_eq!(request.validate_form(), request.validate_form());
        assert_eq!(valid_request().validate_form(), valid_request().validate_form());
    }

    #[test]
    fn test_validator_trait_agrees_with_schema() {
        assert!(valid_request().validate().is_ok());

        let errors = ContactRequest {
            subject: Some("Hey".to_string()),
            ..valid_request()
        }
        .validate()
        .unwrap_err();
        assert!(errors.field_errors().contains_key("subject"));
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn test_camel_case_wire_names() {
        let request: ContactRequest = serde_json::from_value(serde_json::json!({
            "fullName": "Al",
            "email": "a@b.com",
            "country": "US",
            "city": "NY",
            "subject": "Hello there",
            "message": "This message is definitely twenty chars."
        }))
        .unwrap();

        assert_eq!(request, valid_request());
    }
}
