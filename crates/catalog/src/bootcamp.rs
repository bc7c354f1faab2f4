use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devcamper_core::{DomainResult, RecordId};
use devcamper_query::Document;

use crate::validate::{EMAIL_PATTERN, URL_PATTERN, Violations, to_document, trim};

/// Career tracks a bootcamp can offer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

impl Career {
    pub const ALL: [Career; 6] = [
        Career::WebDevelopment,
        Career::MobileDevelopment,
        Career::UiUx,
        Career::DataScience,
        Career::Business,
        Career::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Career::WebDevelopment => "Web Development",
            Career::MobileDevelopment => "Mobile Development",
            Career::UiUx => "UI/UX",
            Career::DataScience => "Data Science",
            Career::Business => "Business",
            Career::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// GeoJSON point plus the address parts returned by geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl GeoLocation {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
            formatted_address: None,
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

fn default_photo() -> String {
    DEFAULT_PHOTO.to_string()
}

/// Persisted bootcamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    pub careers: Vec<Career>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    #[serde(default = "default_photo")]
    pub photo: String,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Owning user.
    pub user: RecordId,
}

impl Bootcamp {
    pub fn to_document(&self) -> DomainResult<Document> {
        to_document(self)
    }
}

/// Request body for create and update.
///
/// Every field is optional at the type level; [`BootcampInput::validate_new`]
/// enforces the required ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Consumed by geocoding on create; never stored.
    #[serde(default, skip_serializing)]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub careers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_assistance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_guarantee: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_gi: Option<bool>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBootcamp {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub careers: Vec<Career>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
}

impl NewBootcamp {
    /// Assemble the record to persist once slug and location are known.
    pub fn into_record(
        self,
        owner: RecordId,
        slug: String,
        location: Option<GeoLocation>,
        created_at: DateTime<Utc>,
    ) -> Bootcamp {
        Bootcamp {
            id: RecordId::new(),
            name: self.name,
            slug,
            description: self.description,
            website: self.website,
            phone: self.phone,
            email: self.email,
            location,
            careers: self.careers,
            average_rating: self.average_rating,
            average_cost: self.average_cost,
            photo: default_photo(),
            housing: self.housing,
            job_assistance: self.job_assistance,
            job_guarantee: self.job_guarantee,
            accept_gi: self.accept_gi,
            created_at,
            user: owner,
        }
    }
}

impl BootcampInput {
    fn check_supplied(&self, v: &mut Violations) -> Vec<Career> {
        v.max_len("name", self.name.as_deref(), 50, "Name can not be more than 50 characters");
        v.max_len(
            "description",
            self.description.as_deref(),
            500,
            "Description can not be more than 500 characters",
        );
        v.pattern(
            "website",
            self.website.as_deref(),
            &URL_PATTERN,
            "Please use a valid URL with HTTP or HTTPS",
        );
        v.max_len(
            "phone",
            self.phone.as_deref(),
            20,
            "Phone number can not be longer than 20 characters",
        );
        v.pattern("email", self.email.as_deref(), &EMAIL_PATTERN, "Please add a valid email");
        v.range(
            "averageRating",
            self.average_rating,
            (1.0, "Rating must be at least 1"),
            (10.0, "Rating must not be more than 10"),
        );

        let mut careers = Vec::new();
        for raw in self.careers.iter().flatten() {
            match Career::parse(raw) {
                Some(c) => careers.push(c),
                None => v.push("careers", format!("'{raw}' is not a valid career")),
            }
        }
        careers
    }

    pub fn validate_new(mut self) -> DomainResult<NewBootcamp> {
        trim(&mut self.name);
        let mut v = Violations::default();
        v.required_str("name", self.name.as_deref(), "Please add a name");
        v.required_str("description", self.description.as_deref(), "Please add a description");
        v.required_str("address", self.address.as_deref(), "Please add an address");
        if self.careers.as_ref().is_none_or(Vec::is_empty) {
            v.push("careers", "Please add at least one career");
        }
        let careers = self.check_supplied(&mut v);
        v.finish()?;

        Ok(NewBootcamp {
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            website: self.website,
            phone: self.phone,
            email: self.email,
            address: self.address.unwrap_or_default(),
            careers,
            average_rating: self.average_rating,
            average_cost: self.average_cost,
            housing: self.housing.unwrap_or(false),
            job_assistance: self.job_assistance.unwrap_or(false),
            job_guarantee: self.job_guarantee.unwrap_or(false),
            accept_gi: self.accept_gi.unwrap_or(false),
        })
    }

    /// Validate only the supplied fields and return them as stored changes.
    ///
    /// Slug and location are not recomputed; a supplied `address` is ignored.
    pub fn validate_patch(mut self) -> DomainResult<Document> {
        trim(&mut self.name);
        let mut v = Violations::default();
        v.not_blank("name", self.name.as_deref(), "Please add a name");
        v.not_blank("description", self.description.as_deref(), "Please add a description");
        if self.careers.as_ref().is_some_and(Vec::is_empty) {
            v.push("careers", "Please add at least one career");
        }
        self.check_supplied(&mut v);
        v.finish()?;
        to_document(&self)
    }
}
