//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Message rendered for failures whose cause is not shown to clients.
pub const SERVER_ERROR: &str = "Server Error";

/// Result type used across the service layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// A single failed schema constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure taxonomy shared by every layer below HTTP.
///
/// Each variant maps to exactly one status code; the HTTP layer only renders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Lookup by identifier found nothing.
    #[error("{0}")]
    NotFound(String),

    /// The principal's role or ownership does not permit the action.
    #[error("{0}")]
    Unauthorized(String),

    /// A business rule or request shape was rejected.
    #[error("{0}")]
    BadRequest(String),

    /// One or more schema constraints failed.
    #[error("{}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// An identifier (or filter value) could not be cast to its expected type.
    #[error("Invalid identifier: {0}")]
    Cast(String),

    /// A unique constraint was violated.
    #[error("Duplicate field value entered")]
    DuplicateKey { fields: Vec<String> },

    /// Anything unclassified. The message is shown to clients as-is.
    #[error("{0}")]
    Internal(String),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn cast(value: impl Into<String>) -> Self {
        Self::Cast(value.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A validation error carrying a single field message.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }

    /// HTTP status code this error renders with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Unauthorized(_) => 401,
            Self::BadRequest(_) | Self::Validation(_) | Self::Cast(_) | Self::DuplicateKey { .. } => 400,
            Self::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_joins_every_field_message() {
        let err = DomainError::Validation(vec![
            FieldViolation::new("name", "Please add a name"),
            FieldViolation::new("description", "Please add a description"),
        ]);
        assert_eq!(err.to_string(), "Please add a name, Please add a description");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(DomainError::not_found("x").status_code(), 404);
        assert_eq!(DomainError::unauthorized("x").status_code(), 401);
        assert_eq!(DomainError::cast("abc").status_code(), 400);
        assert_eq!(DomainError::DuplicateKey { fields: vec!["name".into()] }.status_code(), 400);
        assert_eq!(DomainError::internal("boom").status_code(), 500);
    }

    #[test]
    fn cast_message_names_the_value() {
        assert_eq!(DomainError::cast("not-an-id").to_string(), "Invalid identifier: not-an-id");
    }
}
