//! Error types for pocketbook-core
//!
//! Every failure the engine can report carries a stable error code, a
//! severity and a serializable detail record with suggestions, so a UI can
//! show something more useful than the bare message.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Custom date range ends before it starts
    InvalidDateRange,
    /// Unknown or malformed configuration value
    InvalidValue,
    /// Input record failed validation
    ValidationError,
    /// Duplicate identifier in a collection
    DuplicateEntry,
    /// Export requested with every section disabled
    NothingSelected,
    /// Data could not be decoded
    InvalidFormat,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidDateRange => f.pad("INVALID_DATE_RANGE"),
            ErrorCode::InvalidValue => f.pad("INVALID_VALUE"),
            ErrorCode::ValidationError => f.pad("VALIDATION_ERROR"),
            ErrorCode::DuplicateEntry => f.pad("DUPLICATE_ENTRY"),
            ErrorCode::NothingSelected => f.pad("NOTHING_SELECTED"),
            ErrorCode::InvalidFormat => f.pad("INVALID_FORMAT"),
        }
    }
}

/// Detailed error information for UI responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational, the user can simply adjust a selection
    Info,
    /// Warning - the request was rejected but nothing is broken
    Warning,
    /// Error - the input data itself is unusable
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => f.pad("info"),
            ErrorSeverity::Warning => f.pad("warning"),
            ErrorSeverity::Error => f.pad("error"),
        }
    }
}

/// Main error type for pocketbook-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Duplicate entry: {entry}")]
    DuplicateEntry { entry: String },

    #[error("Nothing selected for export")]
    NothingSelected,

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

impl CoreError {
    /// Shorthand for an unknown configuration value
    pub fn invalid_value(field: &str, value: impl Into<String>) -> Self {
        CoreError::InvalidValue {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::InvalidDateRange { .. } => ErrorCode::InvalidDateRange,
            CoreError::InvalidValue { .. } => ErrorCode::InvalidValue,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
            CoreError::NothingSelected => ErrorCode::NothingSelected,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::InvalidDateRange { .. } => ErrorSeverity::Warning,
            CoreError::InvalidValue { .. } => ErrorSeverity::Warning,
            CoreError::ValidationError { .. } => ErrorSeverity::Error,
            CoreError::DuplicateEntry { .. } => ErrorSeverity::Error,
            CoreError::NothingSelected => ErrorSeverity::Info,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::InvalidDateRange { start, end } => {
                details = details.with_detail(serde_json::json!({
                    "start": start.to_string(),
                    "end": end.to_string(),
                }));
                details = details.with_suggestion(
                    "Pick an end date on or after the start date.".to_string()
                );
            }
            CoreError::InvalidValue { field, value } => {
                details =
                    details.with_detail(serde_json::json!({ "field": field, "value": value }));
                details = details.with_suggestion(format!(
                    "Check the accepted values for '{}'.", field
                ));
            }
            CoreError::ValidationError { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
                details = details.with_suggestion(
                    "Fix the offending record in the snapshot and retry.".to_string()
                );
            }
            CoreError::DuplicateEntry { entry } => {
                details = details.with_suggestion(format!(
                    "Identifiers must be unique; '{}' appears more than once.", entry
                ));
            }
            CoreError::NothingSelected => {
                details = details.with_suggestion(
                    "Select at least one of transactions, pockets or reports.".to_string()
                );
            }
            CoreError::InvalidFormat { .. } => {
                details = details.with_suggestion(
                    "The snapshot must be a JSON object with 'transactions' and 'pockets' arrays."
                        .to_string(),
                );
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::InvalidFormat {
            message: error.to_string(),
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::InvalidDateRange.to_string(), "INVALID_DATE_RANGE");
        assert_eq!(ErrorCode::NothingSelected.to_string(), "NOTHING_SELECTED");
        assert_eq!(
            serde_json::to_string(&ErrorCode::DuplicateEntry).unwrap(),
            "\"DUPLICATE_ENTRY\""
        );
    }

    #[test]
    fn test_core_error_severity() {
        assert_eq!(CoreError::NothingSelected.severity(), ErrorSeverity::Info);
        assert_eq!(
            CoreError::invalid_value("sort.key", "popularity").severity(),
            ErrorSeverity::Warning
        );
        let error = CoreError::InvalidFormat { message: "eof".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_error_details_date_range() {
        let error = CoreError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::InvalidDateRange);
        assert!(details.details.is_some());
        assert!(!details.suggestions.is_empty());
        assert!(details.message.contains("2024-02-01"));
    }

    #[test]
    fn test_error_details_display() {
        let details = CoreError::NothingSelected.to_details();
        let text = details.to_string();
        assert!(text.starts_with("[NOTHING_SELECTED]"));
        assert!(text.contains("Suggestions:"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: CoreError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), ErrorCode::InvalidFormat);
    }
}
