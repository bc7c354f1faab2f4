//! Per-entity services.
//!
//! Each operation is an explicit sequence of steps (validate, authorize,
//! derive, persist); nothing runs implicitly on save or remove.

mod bootcamps;
mod courses;
mod reviews;
mod users;

use std::sync::Arc;

use devcamper_auth::{Principal, PrincipalId, authorize_owner};
use devcamper_catalog::{BOOTCAMPS, UNIQUE_INDEXES};
use devcamper_core::DomainResult;
use devcamper_query::document::reference;
use devcamper_query::{Document, Populate};

use crate::geocoder::{Geocoder, StaticGeocoder};
use crate::store::{DocumentStore, InMemoryDocumentStore};

pub use bootcamps::{BootcampService, PhotoUpload, UploadSettings};
pub use courses::CourseService;
pub use reviews::ReviewService;
pub use users::UserService;

/// `bootcamp` reference replaced by the bootcamp's name and description.
pub fn bootcamp_summary() -> Populate {
    Populate::reference("bootcamp", BOOTCAMPS, &["name", "description"])
}

/// Courses attached to each bootcamp.
pub fn bootcamp_courses() -> Populate {
    Populate::virtual_field("courses", devcamper_catalog::COURSES, "bootcamp")
}

/// Owner-or-admin check against the document's `user` field.
pub(crate) fn ensure_owner(principal: &Principal, doc: &Document) -> DomainResult<()> {
    authorize_owner(principal, reference(doc, "user").map(PrincipalId::from))?;
    Ok(())
}

/// All services over one store.
#[derive(Clone)]
pub struct Services {
    store: Arc<dyn DocumentStore>,
    pub bootcamps: BootcampService,
    pub courses: CourseService,
    pub reviews: ReviewService,
    pub users: UserService,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            bootcamps: BootcampService::new(store.clone(), geocoder),
            courses: CourseService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            users: UserService::new(store.clone()),
            store,
        }
    }

    /// In-memory store with an empty geocoder.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()), Arc::new(StaticGeocoder::default()))
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Register every unique index. Idempotent.
    pub async fn ensure_indexes(&self) -> DomainResult<()> {
        for index in UNIQUE_INDEXES {
            self.store.ensure_unique_index(*index).await?;
        }
        Ok(())
    }
}
