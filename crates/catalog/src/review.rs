use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devcamper_core::{DomainResult, RecordId};
use devcamper_query::Document;

use crate::validate::{Violations, to_document, trim};

/// Persisted review. At most one per (bootcamp, user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub title: String,
    pub text: String,
    pub rating: f64,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    pub bootcamp: RecordId,
    pub user: RecordId,
}

impl Review {
    pub fn to_document(&self) -> DomainResult<Document> {
        to_document(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Target bootcamp when it is not given by the route.
    #[serde(default, skip_serializing)]
    pub bootcamp: Option<String>,
}

const RATING_MESSAGE: &str = "Please add a rating between 1 and 10";

impl ReviewInput {
    fn check_supplied(&self, v: &mut Violations) {
        v.max_len(
            "title",
            self.title.as_deref(),
            100,
            "Title can not be more than 100 characters",
        );
        v.range("rating", self.rating, (1.0, RATING_MESSAGE), (10.0, RATING_MESSAGE));
    }

    pub fn validate_new(mut self, bootcamp: RecordId, author: RecordId, created_at: DateTime<Utc>) -> DomainResult<Review> {
        trim(&mut self.title);
        let mut v = Violations::default();
        v.required_str("title", self.title.as_deref(), "Please add a title for the review");
        v.required_str("text", self.text.as_deref(), "Please add some text");
        v.required("rating", self.rating.as_ref(), RATING_MESSAGE);
        self.check_supplied(&mut v);
        v.finish()?;

        Ok(Review {
            id: RecordId::new(),
            title: self.title.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
            rating: self.rating.unwrap_or_default(),
            created_at,
            bootcamp,
            user: author,
        })
    }

    pub fn validate_patch(mut self) -> DomainResult<Document> {
        trim(&mut self.title);
        let mut v = Violations::default();
        v.not_blank("title", self.title.as_deref(), "Please add a title for the review");
        v.not_blank("text", self.text.as_deref(), "Please add some text");
        self.check_supplied(&mut v);
        v.finish()?;
        to_document(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_review() {
        let input = ReviewInput {
            title: Some("Learned a ton!".into()),
            text: Some("Great instructors".into()),
            rating: Some(8.0),
            bootcamp: None,
        };
        let review = input.validate_new(RecordId::new(), RecordId::new(), Utc::now()).unwrap();
        assert_eq!(review.rating, 8.0);
    }

    #[test]
    fn rating_out_of_range() {
        let input = ReviewInput {
            title: Some("Meh".into()),
            text: Some("ok".into()),
            rating: Some(11.0),
            bootcamp: None,
        };
        let err = input.validate_new(RecordId::new(), RecordId::new(), Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), RATING_MESSAGE);
    }

    #[test]
    fn patch_never_moves_review() {
        let input: ReviewInput =
            serde_json::from_value(json!({"text": "updated", "bootcamp": "someone-else"})).unwrap();
        let doc = input.validate_patch().unwrap();
        assert_eq!(serde_json::Value::Object(doc), json!({"text": "updated"}));
    }
}
