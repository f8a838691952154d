//! # Error Types
//!
//! Validation errors raised before anything reaches the database.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → DbError::Validation → CLI (anyhow)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements, and are
/// raised before any SQL is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    ///
    /// ## When This Occurs
    /// - `sort_by` names a column outside the entity's allow-list
    /// - `search_fields` names a non-searchable column
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Lower bound of a range is above its upper bound.
    #[error("{field}: min {min} is greater than max {max}")]
    InvalidRange {
        field: String,
        min: String,
        max: String,
    },
}

impl ValidationError {
    /// Creates a NotAllowed error from a static allow-list.
    pub fn not_allowed(field: impl Into<String>, allowed: &[&str]) -> Self {
        ValidationError::NotAllowed {
            field: field.into(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        };
        assert_eq!(err.to_string(), "sku must be at most 50 characters");
    }

    #[test]
    fn test_not_allowed_lists_choices() {
        let err = ValidationError::not_allowed("sort_by", &["id", "email"]);
        assert_eq!(
            err.to_string(),
            r#"sort_by must be one of: ["id", "email"]"#
        );
    }

    #[test]
    fn test_invalid_range_message() {
        let err = ValidationError::InvalidRange {
            field: "price_range".to_string(),
            min: "20".to_string(),
            max: "10".to_string(),
        };
        assert_eq!(err.to_string(), "price_range: min 20 is greater than max 10");
    }
}
