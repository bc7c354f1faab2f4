use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devcamper_core::{DomainResult, RecordId};
use devcamper_query::Document;

use crate::validate::{Violations, string_or_number, to_document, trim};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

impl MinimumSkill {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// Persisted course; belongs to one bootcamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: MinimumSkill,
    #[serde(default)]
    pub scholarship_available: bool,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    pub bootcamp: RecordId,
    pub user: RecordId,
}

impl Course {
    pub fn to_document(&self) -> DomainResult<Document> {
        to_document(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub weeks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuition: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarship_available: Option<bool>,
}

impl CourseInput {
    fn check_skill(&self, v: &mut Violations) -> Option<MinimumSkill> {
        let raw = self.minimum_skill.as_deref()?;
        let skill = MinimumSkill::parse(raw);
        if skill.is_none() {
            v.push("minimumSkill", format!("'{raw}' is not a valid minimum skill"));
        }
        skill
    }

    /// Validate a create request and build the record for `bootcamp`.
    pub fn validate_new(mut self, bootcamp: RecordId, owner: RecordId, created_at: DateTime<Utc>) -> DomainResult<Course> {
        trim(&mut self.title);
        let mut v = Violations::default();
        v.required_str("title", self.title.as_deref(), "Please add a course title");
        v.required_str("description", self.description.as_deref(), "Please add a description");
        v.required_str("weeks", self.weeks.as_deref(), "Please add number of weeks");
        v.required("tuition", self.tuition.as_ref(), "Please add a tuition cost");
        v.required_str("minimumSkill", self.minimum_skill.as_deref(), "Please add a minimum skill");
        let skill = self.check_skill(&mut v);
        v.finish()?;

        Ok(Course {
            id: RecordId::new(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            weeks: self.weeks.unwrap_or_default(),
            tuition: self.tuition.unwrap_or_default(),
            minimum_skill: skill.unwrap_or(MinimumSkill::Beginner),
            scholarship_available: self.scholarship_available.unwrap_or(false),
            created_at,
            bootcamp,
            user: owner,
        })
    }

    pub fn validate_patch(mut self) -> DomainResult<Document> {
        trim(&mut self.title);
        let mut v = Violations::default();
        v.not_blank("title", self.title.as_deref(), "Please add a course title");
        v.not_blank("description", self.description.as_deref(), "Please add a description");
        v.not_blank("weeks", self.weeks.as_deref(), "Please add number of weeks");
        self.check_skill(&mut v);
        v.finish()?;
        to_document(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn weeks_accepts_numbers() {
        let input: CourseInput = serde_json::from_value(json!({
            "title": "Front End Web Development",
            "description": "HTML, CSS, JavaScript",
            "weeks": 8,
            "tuition": 8000,
            "minimumSkill": "beginner"
        }))
        .unwrap();
        let bootcamp = RecordId::new();
        let course = input.validate_new(bootcamp, RecordId::new(), Utc::now()).unwrap();
        assert_eq!(course.weeks, "8");
        assert_eq!(course.minimum_skill, MinimumSkill::Beginner);
        assert!(!course.scholarship_available);

        let doc = course.to_document().unwrap();
        assert_eq!(doc["bootcamp"], json!(bootcamp.to_string()));
        assert_eq!(doc["minimumSkill"], json!("beginner"));
    }

    #[test]
    fn missing_and_invalid_fields() {
        let input = CourseInput {
            title: Some("Rust".into()),
            minimum_skill: Some("expert".into()),
            ..Default::default()
        };
        let err = input.validate_new(RecordId::new(), RecordId::new(), Utc::now()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please add a description, Please add number of weeks, Please add a tuition cost, \
             'expert' is not a valid minimum skill"
        );
    }

    #[test]
    fn patch_keeps_supplied_fields() {
        let input = CourseInput {
            tuition: Some(12000.0),
            ..Default::default()
        };
        let doc = input.validate_patch().unwrap();
        assert_eq!(serde_json::Value::Object(doc), json!({"tuition": 12000.0}));
    }
}
