use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devcamper_auth::Role;
use devcamper_core::{DomainResult, RecordId};
use devcamper_query::Document;

use crate::validate::{EMAIL_PATTERN, Violations, to_document, trim};

/// Persisted user. Credentials are managed by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn to_document(&self) -> DomainResult<Document> {
        to_document(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UserInput {
    fn check_supplied(&self, v: &mut Violations) -> Option<Role> {
        v.pattern("email", self.email.as_deref(), &EMAIL_PATTERN, "Please add a valid email");
        let raw = self.role.as_deref()?;
        let role = Role::parse(raw);
        if role.is_none() {
            v.push("role", format!("'{raw}' is not a valid role"));
        }
        role
    }

    pub fn validate_new(mut self, created_at: DateTime<Utc>) -> DomainResult<User> {
        trim(&mut self.name);
        trim(&mut self.email);
        let mut v = Violations::default();
        v.required_str("name", self.name.as_deref(), "Please add a name");
        v.required_str("email", self.email.as_deref(), "Please add an email");
        let role = self.check_supplied(&mut v);
        v.finish()?;

        Ok(User {
            id: RecordId::new(),
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            role: role.unwrap_or_default(),
            created_at,
        })
    }

    pub fn validate_patch(mut self) -> DomainResult<Document> {
        trim(&mut self.name);
        trim(&mut self.email);
        let mut v = Violations::default();
        v.not_blank("name", self.name.as_deref(), "Please add a name");
        v.not_blank("email", self.email.as_deref(), "Please add an email");
        self.check_supplied(&mut v);
        v.finish()?;
        to_document(&self)
    }
}
