//! Collection-oriented document storage.

mod in_memory;
mod postgres;
mod sql;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use devcamper_catalog::UniqueIndex;
use devcamper_core::{DomainError, RecordId, SERVER_ERROR};
use devcamper_query::{Document, Filter, Projection, SortKey};

use crate::geo::GeoPoint;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key in '{collection}' on {fields:?}")]
    DuplicateKey { collection: String, fields: Vec<String> },

    #[error("document has no valid _id")]
    MissingId,

    #[error("stored document is malformed: {0}")]
    Corrupt(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { fields, .. } => DomainError::DuplicateKey { fields },
            other => {
                tracing::error!(error = %other, "store failure");
                DomainError::internal(SERVER_ERROR)
            }
        }
    }
}

/// Shape of a `find` result: order, window and field selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Vec<SortKey>,
    pub skip: u64,
    pub limit: Option<u64>,
    pub projection: Option<Projection>,
}

/// Persistence for schemaless records grouped in named collections.
///
/// Every document carries its identifier under `_id`. Implementations enforce
/// registered unique indexes on insert and update.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn ensure_unique_index(&self, index: UniqueIndex) -> Result<(), StoreError>;

    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError>;

    /// Insert in order; stops at the first failure.
    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<usize, StoreError>;

    async fn find_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Document>, StoreError>;

    async fn find(&self, collection: &str, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Apply `changes` to the stored document and return the result. Keys are
    /// paths: `location.zipcode` sets a nested field and keeps its siblings.
    async fn update_by_id(
        &self,
        collection: &str,
        id: RecordId,
        changes: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Remove one document directly. No dependent records are touched.
    async fn delete_by_id(&self, collection: &str, id: RecordId) -> Result<bool, StoreError>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Documents whose `[longitude, latitude]` pair at `path` lies within
    /// `radius` radians of `center`.
    async fn find_within_sphere(
        &self,
        collection: &str,
        path: &str,
        center: GeoPoint,
        radius: f64,
    ) -> Result<Vec<Document>, StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn ensure_unique_index(&self, index: UniqueIndex) -> Result<(), StoreError> {
        (**self).ensure_unique_index(index).await
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        (**self).insert(collection, doc).await
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<usize, StoreError> {
        (**self).insert_many(collection, docs).await
    }

    async fn find_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Document>, StoreError> {
        (**self).find_by_id(collection, id).await
    }

    async fn find(&self, collection: &str, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>, StoreError> {
        (**self).find(collection, filter, options).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).count(collection, filter).await
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: RecordId,
        changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        (**self).update_by_id(collection, id, changes).await
    }

    async fn delete_by_id(&self, collection: &str, id: RecordId) -> Result<bool, StoreError> {
        (**self).delete_by_id(collection, id).await
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).delete_many(collection, filter).await
    }

    async fn find_within_sphere(
        &self,
        collection: &str,
        path: &str,
        center: GeoPoint,
        radius: f64,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).find_within_sphere(collection, path, center, radius).await
    }
}
