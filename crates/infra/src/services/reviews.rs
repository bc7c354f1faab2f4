use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use devcamper_auth::Principal;
use devcamper_catalog::{BOOTCAMPS, REVIEWS, ReviewInput};
use devcamper_core::{DomainError, DomainResult, RecordId};
use devcamper_query::{Document, Filter, Paginated, QuerySpec};

use super::{bootcamp_summary, ensure_owner};
use crate::pipeline::{advanced_results, populate};
use crate::store::{DocumentStore, FindOptions};

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn DocumentStore>,
}

fn not_found(id: RecordId) -> DomainError {
    DomainError::not_found(format!("No review found with the id of {id}"))
}

impl ReviewService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, spec: &QuerySpec) -> DomainResult<Paginated<Document>> {
        advanced_results(self.store.as_ref(), REVIEWS, spec).await
    }

    pub async fn list_for_bootcamp(&self, bootcamp: RecordId) -> DomainResult<Vec<Document>> {
        Ok(self
            .store
            .find(REVIEWS, &Filter::eq("bootcamp", bootcamp.to_string()), &FindOptions::default())
            .await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: RecordId) -> DomainResult<Document> {
        let doc = self.store.find_by_id(REVIEWS, id).await?.ok_or_else(|| not_found(id))?;
        let mut docs = [doc];
        populate(self.store.as_ref(), &bootcamp_summary(), &mut docs).await?;
        let [doc] = docs;
        Ok(doc)
    }

    /// Review a bootcamp named by the route or, failing that, by the body.
    ///
    /// A second review of the same bootcamp by the same user is a duplicate key.
    #[instrument(skip(self, principal, input), fields(principal = %principal.id))]
    pub async fn create(
        &self,
        principal: &Principal,
        bootcamp: Option<RecordId>,
        input: ReviewInput,
    ) -> DomainResult<Document> {
        let bootcamp = match bootcamp {
            Some(id) => id,
            None => input
                .bootcamp
                .as_deref()
                .ok_or_else(|| DomainError::invalid_field("bootcamp", "Please add a bootcamp"))?
                .parse::<RecordId>()?,
        };
        if self.store.find_by_id(BOOTCAMPS, bootcamp).await?.is_none() {
            return Err(DomainError::not_found(format!("No bootcamp with the id of {bootcamp}")));
        }

        let review = input.validate_new(bootcamp, principal.id.into(), Utc::now())?;
        Ok(self.store.insert(REVIEWS, review.to_document()?).await?)
    }

    #[instrument(skip(self, principal, input), fields(id = %id, principal = %principal.id))]
    pub async fn update(&self, principal: &Principal, id: RecordId, input: ReviewInput) -> DomainResult<Document> {
        let existing = self.store.find_by_id(REVIEWS, id).await?.ok_or_else(|| not_found(id))?;
        ensure_owner(principal, &existing)?;

        let changes = input.validate_patch()?;
        self.store
            .update_by_id(REVIEWS, id, changes)
            .await?
            .ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self, principal), fields(id = %id, principal = %principal.id))]
    pub async fn remove(&self, principal: &Principal, id: RecordId) -> DomainResult<()> {
        let existing = self.store.find_by_id(REVIEWS, id).await?.ok_or_else(|| not_found(id))?;
        ensure_owner(principal, &existing)?;
        self.store.delete_by_id(REVIEWS, id).await?;
        Ok(())
    }
}
