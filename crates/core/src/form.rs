//! Form drafts, field errors and server error routing.
//!
//! A draft is the unsaved client-side copy of an entity's editable fields.
//! Field errors are keyed by the wire (camelCase) name of the field, the
//! same name the server uses when it rejects a submission, so client-side
//! and server-side errors land on the same form field.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::naming::{humanize, snake_to_camel};

// ---------------------------------------------------------------------------
// FieldErrors
// ---------------------------------------------------------------------------

/// Error messages keyed by wire field name. One message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Record a message for `field`; the first message for a field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.insert(field, message);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert `validator` output, renaming Rust fields to wire names.
    ///
    /// Rules without a message get `"<Field> is invalid"`.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, errs) in errors.field_errors() {
            let wire = snake_to_camel(&field.to_string());
            let message = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{} is invalid", humanize(&wire)));
            out.insert(wire, message);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Editable fields of an entity, validated before submission.
pub trait Draft: Validate + Serialize {
    /// Checks spanning more than one field, keyed by the field to blame.
    fn cross_field_errors(&self) -> FieldErrors {
        FieldErrors::new()
    }

    /// Every client-side error for this draft; empty means submittable.
    fn check(&self) -> FieldErrors {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from_validation(&e),
        };
        errors.merge(self.cross_field_errors());
        errors
    }

    /// Wire names of the fields this draft submits.
    fn field_names(&self) -> Vec<String> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Server error bodies
// ---------------------------------------------------------------------------

/// The useful parts of a server error response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerErrorBody {
    pub message: Option<String>,
    pub field_errors: FieldErrors,
}

fn message_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("msg"))
            .and_then(message_of),
        Value::Array(items) => items.iter().find_map(message_of),
        _ => None,
    }
}

impl ServerErrorBody {
    /// Extract a top-level message and per-field messages.
    ///
    /// Understands `errors` as an object of `field -> {message} | string |
    /// [string]`, or as an array of `{path|param|field, msg|message}`.
    pub fn parse(body: &Value) -> Self {
        let message = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(message_of);

        let mut field_errors = FieldErrors::new();
        match body.get("errors") {
            Some(Value::Object(map)) => {
                for (field, detail) in map {
                    if let Some(msg) = message_of(detail) {
                        field_errors.insert(field.clone(), msg);
                    }
                }
            }
            Some(Value::Array(items)) => {
                for item in items {
                    let field = ["path", "param", "field"]
                        .iter()
                        .find_map(|k| item.get(*k).and_then(Value::as_str));
                    if let (Some(field), Some(msg)) = (field, message_of(item)) {
                        field_errors.insert(field, msg);
                    }
                }
            }
            _ => {}
        }

        Self {
            message,
            field_errors,
        }
    }

    /// Split field errors into those the form shows inline and the rest.
    ///
    /// Returns the inline errors and the messages that need a generic
    /// notification. When nothing maps inline, the top-level message (if
    /// any) is also surfaced as a notification.
    pub fn route(&self, known_fields: &[String]) -> (FieldErrors, Vec<String>) {
        let mut inline = FieldErrors::new();
        let mut unmapped = Vec::new();
        for (field, message) in self.field_errors.iter() {
            if known_fields.iter().any(|k| k == field) {
                inline.insert(field, message);
            } else {
                unmapped.push(message.to_string());
            }
        }
        if inline.is_empty() && unmapped.is_empty() {
            if let Some(message) = &self.message {
                unmapped.push(message.clone());
            }
        }
        (inline, unmapped)
    }
}

// ---------------------------------------------------------------------------
// Reusable field validators
// ---------------------------------------------------------------------------

/// Custom `validator` functions shared by entity drafts.
pub mod rules {
    use chrono::{Datelike, NaiveDate};
    use validator::ValidationError;

    use crate::age_category::parse_age_limit;

    fn fail(code: &'static str, message: &'static str) -> ValidationError {
        let mut err = ValidationError::new(code);
        err.message = Some(message.into());
        err
    }

    /// The message of a rule failure, or its code when it has none.
    pub fn describe(err: &ValidationError) -> String {
        err.message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string())
    }

    /// Indian mobile numbers: exactly ten digits.
    pub fn mobile(value: &str) -> Result<(), ValidationError> {
        if value.len() == 10 && value.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err(fail("mobile", "Mobile number must be 10 digits"))
        }
    }

    /// Aadhaar numbers: exactly twelve digits, spaces allowed between groups.
    pub fn aadhar(value: &str) -> Result<(), ValidationError> {
        let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() == 12 && digits.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err(fail("aadhar", "Aadhaar number must be 12 digits"))
        }
    }

    /// A label of the form "Under N".
    pub fn age_limit_label(value: &str) -> Result<(), ValidationError> {
        parse_age_limit(value)
            .map(|_| ())
            .ok_or_else(|| fail("age_limit", "Age limit must look like \"Under 14\""))
    }

    /// A date not after today.
    pub fn not_in_future(value: &NaiveDate) -> Result<(), ValidationError> {
        if *value <= chrono::Local::now().date_naive() {
            Ok(())
        } else {
            Err(fail("future_date", "Date cannot be in the future"))
        }
    }

    /// A plausible exam year: 1950 up to the current year.
    pub fn exam_year(value: i32) -> Result<(), ValidationError> {
        let current = chrono::Local::now().year();
        if (1950..=current).contains(&value) {
            Ok(())
        } else {
            Err(fail("exam_year", "Exam year must be between 1950 and this year"))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct SampleDraft {
        #[validate(length(min = 2, message = "Club name is required"))]
        club_name: String,
        #[validate(email)]
        email: String,
        #[validate(custom(function = "rules::mobile"))]
        mobile: String,
    }

    impl Draft for SampleDraft {}

    fn valid() -> SampleDraft {
        SampleDraft {
            club_name: "Pune Tigers".into(),
            email: "club@example.org".into(),
            mobile: "9876543210".into(),
        }
    }

    #[test]
    fn valid_draft_has_no_errors() {
        assert!(valid().check().is_empty());
    }

    #[test]
    fn validation_errors_use_wire_names() {
        let draft = SampleDraft {
            club_name: "x".into(),
            ..valid()
        };
        let errors = draft.check();
        assert_eq!(errors.get("clubName"), Some("Club name is required"));
        assert_eq!(errors.get("club_name"), None);
    }

    #[test]
    fn rule_without_message_gets_generic_text() {
        let draft = SampleDraft {
            email: "nope".into(),
            ..valid()
        };
        assert_eq!(draft.check().get("email"), Some("Email is invalid"));
    }

    #[test]
    fn custom_rule_message_is_kept() {
        let draft = SampleDraft {
            mobile: "12345".into(),
            ..valid()
        };
        assert_eq!(draft.check().get("mobile"), Some("Mobile number must be 10 digits"));
    }

    #[test]
    fn field_names_are_wire_names() {
        let mut names = valid().field_names();
        names.sort();
        assert_eq!(names, vec!["clubName", "email", "mobile"]);
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.insert("email", "first");
        errors.insert("email", "second");
        assert_eq!(errors.get("email"), Some("first"));
    }

    // -- server error bodies -------------------------------------------------

    #[test]
    fn parses_nested_message_objects() {
        let body = ServerErrorBody::parse(&json!({
            "message": "Validation failed",
            "errors": {"email": {"message": "Email already registered"}}
        }));
        assert_eq!(body.message.as_deref(), Some("Validation failed"));
        assert_eq!(body.field_errors.get("email"), Some("Email already registered"));
    }

    #[test]
    fn parses_string_and_array_forms() {
        let body = ServerErrorBody::parse(&json!({
            "errors": {"mobile": "Taken", "clubName": ["Too short", "Bad"]}
        }));
        assert_eq!(body.field_errors.get("mobile"), Some("Taken"));
        assert_eq!(body.field_errors.get("clubName"), Some("Too short"));
    }

    #[test]
    fn parses_express_validator_arrays() {
        let body = ServerErrorBody::parse(&json!({
            "errors": [{"path": "aadharNumber", "msg": "Duplicate Aadhaar"}]
        }));
        assert_eq!(body.field_errors.get("aadharNumber"), Some("Duplicate Aadhaar"));
    }

    #[test]
    fn error_key_is_a_message_fallback() {
        let body = ServerErrorBody::parse(&json!({"error": "Club not found"}));
        assert_eq!(body.message.as_deref(), Some("Club not found"));
        assert!(body.field_errors.is_empty());
    }

    #[test]
    fn routing_touches_only_known_fields() {
        let body = ServerErrorBody::parse(&json!({
            "errors": {"email": {"message": "Email already registered"}}
        }));
        let known = valid().field_names();
        let (inline, unmapped) = body.route(&known);
        assert_eq!(inline.len(), 1);
        assert_eq!(inline.get("email"), Some("Email already registered"));
        assert!(unmapped.is_empty());
    }

    #[test]
    fn unknown_fields_become_notifications() {
        let body = ServerErrorBody::parse(&json!({
            "message": "Rejected",
            "errors": {"licence": "Licence expired"}
        }));
        let (inline, unmapped) = body.route(&valid().field_names());
        assert!(inline.is_empty());
        assert_eq!(unmapped, vec!["Licence expired".to_string()]);
    }

    #[test]
    fn bare_message_becomes_notification() {
        let body = ServerErrorBody::parse(&json!({"message": "Server busy"}));
        let (inline, unmapped) = body.route(&valid().field_names());
        assert!(inline.is_empty());
        assert_eq!(unmapped, vec!["Server busy".to_string()]);
    }

    // -- rules ---------------------------------------------------------------

    #[test]
    fn aadhar_allows_grouped_digits() {
        assert!(rules::aadhar("1234 5678 9012").is_ok());
        assert!(rules::aadhar("1234567890").is_err());
        assert!(rules::aadhar("12345678901a").is_err());
    }

    #[test]
    fn age_limit_label_rule() {
        assert!(rules::age_limit_label("Under 16").is_ok());
        assert!(rules::age_limit_label("Sixteen").is_err());
    }

    #[test]
    fn exam_year_bounds() {
        assert!(rules::exam_year(1949).is_err());
        assert!(rules::exam_year(2001).is_ok());
        assert!(rules::exam_year(9999).is_err());
    }
}
