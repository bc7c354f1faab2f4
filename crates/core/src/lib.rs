//! `devcamper-core`: shared building blocks for the directory service.
//!
//! This crate contains identifiers and the error taxonomy only (no IO).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult, FieldViolation, SERVER_ERROR};
pub use id::RecordId;
