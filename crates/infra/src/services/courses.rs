use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use devcamper_auth::Principal;
use devcamper_catalog::{BOOTCAMPS, COURSES, CourseInput};
use devcamper_core::{DomainError, DomainResult, RecordId};
use devcamper_query::{Document, Filter, Paginated, QuerySpec};

use super::{bootcamp_summary, ensure_owner};
use crate::pipeline::{advanced_results, populate};
use crate::store::{DocumentStore, FindOptions};

#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn DocumentStore>,
}

fn not_found(id: RecordId) -> DomainError {
    DomainError::not_found(format!("No course with the id of {id}"))
}

impl CourseService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, spec: &QuerySpec) -> DomainResult<Paginated<Document>> {
        advanced_results(self.store.as_ref(), COURSES, spec).await
    }

    /// Every course of one bootcamp, oldest first.
    pub async fn list_for_bootcamp(&self, bootcamp: RecordId) -> DomainResult<Vec<Document>> {
        Ok(self
            .store
            .find(COURSES, &Filter::eq("bootcamp", bootcamp.to_string()), &FindOptions::default())
            .await?)
    }

    /// One course with its bootcamp's name and description.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: RecordId) -> DomainResult<Document> {
        let doc = self.store.find_by_id(COURSES, id).await?.ok_or_else(|| not_found(id))?;
        let mut docs = [doc];
        populate(self.store.as_ref(), &bootcamp_summary(), &mut docs).await?;
        let [doc] = docs;
        Ok(doc)
    }

    /// Add a course to a bootcamp the principal owns (or any, for admins).
    #[instrument(skip(self, principal, input), fields(bootcamp = %bootcamp, principal = %principal.id))]
    pub async fn create(&self, principal: &Principal, bootcamp: RecordId, input: CourseInput) -> DomainResult<Document> {
        let parent = self
            .store
            .find_by_id(BOOTCAMPS, bootcamp)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("No bootcamp with the id of {bootcamp}")))?;
        ensure_owner(principal, &parent)?;

        let course = input.validate_new(bootcamp, principal.id.into(), Utc::now())?;
        Ok(self.store.insert(COURSES, course.to_document()?).await?)
    }

    #[instrument(skip(self, principal, input), fields(id = %id, principal = %principal.id))]
    pub async fn update(&self, principal: &Principal, id: RecordId, input: CourseInput) -> DomainResult<Document> {
        let existing = self.store.find_by_id(COURSES, id).await?.ok_or_else(|| not_found(id))?;
        ensure_owner(principal, &existing)?;

        let changes = input.validate_patch()?;
        self.store
            .update_by_id(COURSES, id, changes)
            .await?
            .ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self, principal), fields(id = %id, principal = %principal.id))]
    pub async fn remove(&self, principal: &Principal, id: RecordId) -> DomainResult<()> {
        let existing = self.store.find_by_id(COURSES, id).await?.ok_or_else(|| not_found(id))?;
        ensure_owner(principal, &existing)?;
        self.store.delete_by_id(COURSES, id).await?;
        Ok(())
    }
}
