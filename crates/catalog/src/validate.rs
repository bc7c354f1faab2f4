//! Schema checks shared by the entity inputs.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use devcamper_core::{DomainError, DomainResult, FieldViolation};
use devcamper_query::Document;

pub(crate) static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&/=]*)",
    )
    .expect("url pattern compiles")
});

pub(crate) static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$")
        .expect("email pattern compiles")
});

/// Collects every failing field so one response reports all of them.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<FieldViolation>);

impl Violations {
    pub(crate) fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    /// `value` must be present and, for strings, non-blank.
    pub(crate) fn required_str(&mut self, field: &str, value: Option<&str>, message: &str) {
        if value.is_none_or(|v| v.trim().is_empty()) {
            self.push(field, message);
        }
    }

    pub(crate) fn required<T>(&mut self, field: &str, value: Option<&T>, message: &str) {
        if value.is_none() {
            self.push(field, message);
        }
    }

    /// A supplied string must not be blank (patch semantics for required fields).
    pub(crate) fn not_blank(&mut self, field: &str, value: Option<&str>, message: &str) {
        if value.is_some_and(|v| v.trim().is_empty()) {
            self.push(field, message);
        }
    }

    pub(crate) fn max_len(&mut self, field: &str, value: Option<&str>, max: usize, message: &str) {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.push(field, message);
        }
    }

    pub(crate) fn pattern(&mut self, field: &str, value: Option<&str>, pattern: &Regex, message: &str) {
        if value.is_some_and(|v| !pattern.is_match(v)) {
            self.push(field, message);
        }
    }

    pub(crate) fn range(&mut self, field: &str, value: Option<f64>, min: (f64, &str), max: (f64, &str)) {
        match value {
            Some(v) if v < min.0 => self.push(field, min.1),
            Some(v) if v > max.0 => self.push(field, max.1),
            _ => {}
        }
    }

    pub(crate) fn finish(self) -> DomainResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.0))
        }
    }
}

/// Trim a supplied string in place.
pub(crate) fn trim(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        let trimmed = v.trim();
        if trimmed.len() != v.len() {
            *v = trimmed.to_string();
        }
    }
}

/// Serialize a record or patch into its stored document shape.
pub(crate) fn to_document<T: Serialize>(value: &T) -> DomainResult<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DomainError::internal(format!("expected object, got {other}"))),
        Err(e) => Err(DomainError::internal(e.to_string())),
    }
}

/// Accept `"4"` or `4` for string-typed fields.
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("expected string or number, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_requires_scheme() {
        assert!(URL_PATTERN.is_match("https://devworks.com"));
        assert!(URL_PATTERN.is_match("http://www.example.io/path?x=1"));
        assert!(!URL_PATTERN.is_match("devworks.com"));
    }

    #[test]
    fn email_shape() {
        assert!(EMAIL_PATTERN.is_match("enroll@devworks.com"));
        assert!(EMAIL_PATTERN.is_match("john.doe@mail.co.uk"));
        assert!(!EMAIL_PATTERN.is_match("not-an-email"));
        assert!(!EMAIL_PATTERN.is_match("a@b"));
    }

    #[test]
    fn violations_collect_in_order() {
        let mut v = Violations::default();
        v.required_str("name", None, "Please add a name");
        v.max_len("phone", Some("123456789012345678901"), 20, "too long");
        v.range("rating", Some(11.0), (1.0, "low"), (10.0, "high"));
        let err = v.finish().unwrap_err();
        assert_eq!(err.to_string(), "Please add a name, too long, high");
    }
}
