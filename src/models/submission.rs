use std::collections::BTreeMap;

use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/submit`. Absent fields deserialize empty so garde
/// reports them per field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SubmitRequest {
    #[serde(default)]
    #[garde(length(chars, min = 2, max = 100))]
    pub channel: String,

    #[serde(default)]
    #[garde(email)]
    pub email: String,
}

impl SubmitRequest {
    /// Surrounding whitespace is not part of either field.
    pub fn trimmed(self) -> Self {
        Self {
            channel: self.channel.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

/// Field name to the validation messages raised for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub fn field_errors(report: &garde::Report) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (path, error) in report.iter() {
        errors
            .entry(path.to_string())
            .or_default()
            .push(error.message().to_string());
    }
    errors
}

/// Query string of `GET /api/performance-summary`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSummaryQuery {
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: String,
    pub email: String,
    #[serde(default)]
    pub should_enable_summary: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitData {
    pub job_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleData {
    pub channel_id: String,
    pub should_enable_summary: bool,
}

/// Success envelope shared by the public endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(channel: &str, email: &str) -> SubmitRequest {
        SubmitRequest {
            channel: channel.to_string(),
            email: email.to_string(),
        }
        .trimmed()
    }

    #[test]
    fn test_valid_submission() {
        assert!(request("@somehandle", "a@b.com").validate().is_ok());
    }

    #[test]
    fn test_channel_is_trimmed_before_length_check() {
        let report = request("  x  ", "a@b.com").validate().unwrap_err();
        let errors = field_errors(&report);
        assert!(errors.contains_key("channel"));
        assert!(!errors.contains_key("email"));
    }

    #[test]
    fn test_channel_too_long() {
        let long = "c".repeat(101);
        assert!(request(&long, "a@b.com").validate().is_err());
        assert!(request(&"c".repeat(100), "a@b.com").validate().is_ok());
    }

    #[test]
    fn test_missing_fields_reported_per_field() {
        let body: SubmitRequest = serde_json::from_str(r#"{"channel": "@somehandle"}"#).unwrap();
        let errors = field_errors(&body.trimmed().validate().unwrap_err());
        assert!(errors.contains_key("email"));
        assert!(!errors.contains_key("channel"));

        let empty: SubmitRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(field_errors(&empty.validate().unwrap_err()).len(), 2);
    }

    #[test]
    fn test_invalid_email_reported_per_field() {
        let report = request("NoSuchChannelXYZ", "not-an-email").validate().unwrap_err();
        let errors = field_errors(&report);
        assert_eq!(errors.len(), 1);
        assert!(!errors["email"].is_empty());
    }
}
