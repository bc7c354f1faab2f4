use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use devcamper_catalog::UniqueIndex;
use devcamper_core::RecordId;
use devcamper_query::document::{get_path, record_id, set_path};
use devcamper_query::sort::compare_documents;
use devcamper_query::{Document, Filter};

use super::{DocumentStore, FindOptions, StoreError};
use crate::geo::GeoPoint;

#[derive(Debug, Default)]
struct State {
    /// Documents per collection, in insertion order.
    collections: HashMap<String, Vec<Document>>,
    indexes: Vec<UniqueIndex>,
}

impl State {
    fn docs(&self, collection: &str) -> &[Document] {
        self.collections.get(collection).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First unique index that `candidate` would violate, ignoring the
    /// document with id `skip`.
    fn violated(&self, collection: &str, candidate: &Document, skip: Option<RecordId>) -> Option<&UniqueIndex> {
        self.indexes
            .iter()
            .filter(|ix| ix.collection == collection)
            .find(|ix| {
                let key: Vec<Option<&Value>> = ix.fields.iter().map(|f| get_path(candidate, f)).collect();
                self.docs(collection).iter().any(|existing| {
                    record_id(existing) != skip
                        && ix.fields.iter().zip(&key).all(|(f, v)| get_path(existing, f) == *v)
                })
            })
    }
}

fn duplicate(index: &UniqueIndex) -> StoreError {
    StoreError::DuplicateKey {
        collection: index.collection.to_string(),
        fields: index.fields.iter().map(|f| f.to_string()).collect(),
    }
}

/// In-memory document store.
///
/// Intended for tests/dev. Not optimized for performance: every query scans
/// its collection.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    state: RwLock<State>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn insert_locked(state: &mut State, collection: &str, doc: Document) -> Result<Document, StoreError> {
        if record_id(&doc).is_none() {
            return Err(StoreError::MissingId);
        }
        if let Some(index) = state.violated(collection, &doc, None) {
            return Err(duplicate(index));
        }
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn ensure_unique_index(&self, index: UniqueIndex) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.indexes.contains(&index) {
            state.indexes.push(index);
        }
        Ok(())
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        let mut state = self.write()?;
        Self::insert_locked(&mut state, collection, doc)
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<usize, StoreError> {
        let mut state = self.write()?;
        let mut inserted = 0;
        for doc in docs {
            Self::insert_locked(&mut state, collection, doc)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn find_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Document>, StoreError> {
        let state = self.read()?;
        Ok(state
            .docs(collection)
            .iter()
            .find(|d| record_id(d) == Some(id))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>, StoreError> {
        let state = self.read()?;
        let mut matched: Vec<&Document> = state.docs(collection).iter().filter(|d| filter.matches(d)).collect();
        if !options.sort.is_empty() {
            // Stable: ties keep insertion order.
            matched.sort_by(|a, b| compare_documents(a, b, &options.sort));
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|d| match &options.projection {
                Some(p) => p.apply(d),
                None => d.clone(),
            })
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let state = self.read()?;
        Ok(state.docs(collection).iter().filter(|d| filter.matches(d)).count() as u64)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: RecordId,
        changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut state = self.write()?;
        let Some(position) = state.docs(collection).iter().position(|d| record_id(d) == Some(id)) else {
            return Ok(None);
        };

        let mut updated = state.docs(collection)[position].clone();
        for (path, value) in changes {
            set_path(&mut updated, &path, value);
        }
        if let Some(index) = state.violated(collection, &updated, Some(id)) {
            return Err(duplicate(index));
        }

        if let Some(docs) = state.collections.get_mut(collection) {
            docs[position] = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, collection: &str, id: RecordId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let Some(docs) = state.collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| record_id(d) != Some(id));
        Ok(docs.len() != before)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        let Some(docs) = state.collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }

    async fn find_within_sphere(
        &self,
        collection: &str,
        path: &str,
        center: GeoPoint,
        radius: f64,
    ) -> Result<Vec<Document>, StoreError> {
        let state = self.read()?;
        Ok(state
            .docs(collection)
            .iter()
            .filter(|d| {
                get_path(d, path)
                    .and_then(GeoPoint::from_coordinates)
                    .is_some_and(|p| center.angular_distance(&p) <= radius)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devcamper_query::{ID_FIELD, Projection, SortKey};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        let mut d = value.as_object().cloned().unwrap();
        d.entry(ID_FIELD).or_insert_with(|| json!(RecordId::new().to_string()));
        d
    }

    const NAME_INDEX: UniqueIndex = UniqueIndex {
        collection: "bootcamps",
        fields: &["name"],
    };

    #[tokio::test]
    async fn unique_index_rejects_duplicates_on_insert_and_update() {
        let store = InMemoryDocumentStore::new();
        store.ensure_unique_index(NAME_INDEX).await.unwrap();

        store.insert("bootcamps", doc(json!({"name": "A"}))).await.unwrap();
        let b = store.insert("bootcamps", doc(json!({"name": "B"}))).await.unwrap();

        let err = store.insert("bootcamps", doc(json!({"name": "A"}))).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));

        let b_id = record_id(&b).unwrap();
        let mut changes = Document::new();
        changes.insert("name".into(), json!("A"));
        assert!(store.update_by_id("bootcamps", b_id, changes).await.is_err());

        // Re-saving its own value is not a conflict.
        let mut same = Document::new();
        same.insert("name".into(), json!("B"));
        assert!(store.update_by_id("bootcamps", b_id, same).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn find_applies_filter_sort_window_and_projection() {
        let store = InMemoryDocumentStore::new();
        for (name, cost) in [("a", 10), ("b", 30), ("c", 20), ("d", 40)] {
            store
                .insert("bootcamps", doc(json!({"name": name, "averageCost": cost})))
                .await
                .unwrap();
        }
        let filter = Filter::from_params(&devcamper_query::QueryParams::parse("averageCost[gte]=20")).unwrap();
        let options = FindOptions {
            sort: vec![SortKey::desc("averageCost")],
            skip: 1,
            limit: Some(1),
            projection: Projection::parse("name,-_id"),
        };
        let found = store.find("bootcamps", &filter, &options).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(Value::Object(found[0].clone()), json!({"name": "b"}));
        assert_eq!(store.count("bootcamps", &filter).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn delete_many_reports_removed() {
        let store = InMemoryDocumentStore::new();
        let owner = RecordId::new().to_string();
        for _ in 0..3 {
            store.insert("courses", doc(json!({"bootcamp": owner}))).await.unwrap();
        }
        store.insert("courses", doc(json!({"bootcamp": "other"}))).await.unwrap();
        assert_eq!(store.delete_many("courses", &Filter::eq("bootcamp", owner)).await.unwrap(), 3);
        assert_eq!(store.count("courses", &Filter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn sphere_query_uses_coordinates() {
        let store = InMemoryDocumentStore::new();
        store
            .insert("bootcamps", doc(json!({"name": "boston", "location": {"coordinates": [-71.0589, 42.3601]}})))
            .await
            .unwrap();
        store
            .insert("bootcamps", doc(json!({"name": "la", "location": {"coordinates": [-118.2437, 34.0522]}})))
            .await
            .unwrap();
        store.insert("bootcamps", doc(json!({"name": "nowhere"}))).await.unwrap();

        let center = GeoPoint::new(-71.4128, 41.8240);
        let near = store
            .find_within_sphere("bootcamps", "location.coordinates", center, 50.0 / crate::EARTH_RADIUS_MILES)
            .await
            .unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0]["name"], json!("boston"));
    }

    #[tokio::test]
    async fn documents_without_id_are_rejected() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .insert("bootcamps", json!({"name": "x"}).as_object().cloned().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingId));
    }
}
