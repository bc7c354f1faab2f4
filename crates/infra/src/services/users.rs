use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use devcamper_catalog::{USERS, UserInput};
use devcamper_core::{DomainError, DomainResult, RecordId};
use devcamper_query::{Document, Paginated, QuerySpec};

use crate::pipeline::advanced_results;
use crate::store::DocumentStore;

/// User administration. Callers restrict access to administrators.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

fn not_found(id: RecordId) -> DomainError {
    DomainError::not_found(format!("No user with the id of {id}"))
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, spec: &QuerySpec) -> DomainResult<Paginated<Document>> {
        advanced_results(self.store.as_ref(), USERS, spec).await
    }

    pub async fn get(&self, id: RecordId) -> DomainResult<Document> {
        self.store.find_by_id(USERS, id).await?.ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: UserInput) -> DomainResult<Document> {
        let user = input.validate_new(Utc::now())?;
        Ok(self.store.insert(USERS, user.to_document()?).await?)
    }

    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn update(&self, id: RecordId, input: UserInput) -> DomainResult<Document> {
        let changes = input.validate_patch()?;
        self.store
            .update_by_id(USERS, id, changes)
            .await?
            .ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove(&self, id: RecordId) -> DomainResult<()> {
        if !self.store.delete_by_id(USERS, id).await? {
            return Err(not_found(id));
        }
        Ok(())
    }
}
