use thiserror::Error;

use devcamper_core::DomainError;

/// Failure while turning request parameters into a query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A bracketed sub-key that is not one of the supported operators.
    #[error("unsupported operator '{operator}' on field '{field}'")]
    UnsupportedOperator { field: String, operator: String },
}

impl From<QueryError> for DomainError {
    fn from(err: QueryError) -> Self {
        match err {
            // The value cannot be cast into a comparison the store understands.
            QueryError::UnsupportedOperator { field, operator } => {
                DomainError::cast(format!("{field}[{operator}]"))
            }
        }
    }
}
