//! Execution of a [`QuerySpec`] against a store.

use tracing::instrument;

use devcamper_core::DomainResult;
use devcamper_query::document::{get_path, record_id, reference, set_path};
use devcamper_query::{Document, Filter, Paginated, Populate, Projection, QuerySpec};
use serde_json::Value;

use crate::store::{DocumentStore, FindOptions};

/// Count, fetch one page, populate, then project.
///
/// `total` counts every document matching the filter, independent of the
/// page window and projection. When a populate directive is present the page
/// is fetched whole so joins can read `_id` and the reference field; the
/// projection is applied afterwards and the populated path always survives it.
#[instrument(skip(store, spec), fields(page = spec.page.page, limit = spec.page.limit))]
pub async fn advanced_results(
    store: &dyn DocumentStore,
    collection: &str,
    spec: &QuerySpec,
) -> DomainResult<Paginated<Document>> {
    let total = store.count(collection, &spec.filter).await?;

    let options = FindOptions {
        sort: spec.sort.clone(),
        skip: spec.page.start_index(),
        limit: Some(spec.page.limit),
        projection: if spec.populate.is_some() { None } else { spec.projection.clone() },
    };
    let mut docs = store.find(collection, &spec.filter, &options).await?;

    if let Some(directive) = &spec.populate {
        populate(store, directive, &mut docs).await?;
        if let Some(projection) = &spec.projection {
            for doc in docs.iter_mut() {
                *doc = project_keeping(projection, doc, directive.path());
            }
        }
    }

    Ok(Paginated::new(docs, total, &spec.page))
}

fn project_keeping(projection: &Projection, doc: &Document, path: &str) -> Document {
    let joined = get_path(doc, path).cloned();
    let mut out = projection.apply(doc);
    if let Some(value) = joined {
        set_path(&mut out, path, value);
    }
    out
}

/// Join related records into each document.
///
/// A reference to a missing record becomes `null`; documents lacking the
/// reference (or their own `_id`, for virtual joins) are left untouched.
pub async fn populate(store: &dyn DocumentStore, directive: &Populate, docs: &mut [Document]) -> DomainResult<()> {
    match directive {
        Populate::Reference {
            path,
            collection,
            select,
        } => {
            let projection = Projection::parse(&select.join(","));
            for doc in docs.iter_mut() {
                let Some(target) = reference(doc, path) else {
                    continue;
                };
                let related = store
                    .find_by_id(collection, target)
                    .await?
                    .map(|r| match &projection {
                        Some(p) => p.apply(&r),
                        None => r,
                    })
                    .map(Value::Object)
                    .unwrap_or(Value::Null);
                set_path(doc, path, related);
            }
        }
        Populate::Virtual {
            path,
            collection,
            foreign_field,
        } => {
            for doc in docs.iter_mut() {
                let Some(id) = record_id(doc) else {
                    continue;
                };
                let related = store
                    .find(collection, &Filter::eq(foreign_field.as_str(), id.to_string()), &FindOptions::default())
                    .await?;
                set_path(doc, path, Value::Array(related.into_iter().map(Value::Object).collect()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;
    use devcamper_core::RecordId;
    use devcamper_query::{Cursor, QueryParams};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    async fn seed(store: &InMemoryDocumentStore, n: usize) {
        for i in 0..n {
            store
                .insert(
                    "bootcamps",
                    doc(json!({
                        "_id": RecordId::new().to_string(),
                        "name": format!("camp {i:02}"),
                        "createdAt": format!("2024-01-01T00:00:{i:02}.000Z"),
                    })),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn thirty_records_default_window() {
        let store = InMemoryDocumentStore::new();
        seed(&store, 30).await;

        let page = advanced_results(&store, "bootcamps", &QuerySpec::default()).await.unwrap();
        assert_eq!(page.count, 25);
        assert_eq!(page.total, 30);
        assert_eq!(page.pagination.next, Some(Cursor { page: 2, limit: 25 }));
        assert_eq!(page.pagination.prev, None);
        // Newest first.
        assert_eq!(page.data[0]["name"], json!("camp 29"));
    }

    #[tokio::test]
    async fn total_ignores_window_but_respects_filter() {
        let store = InMemoryDocumentStore::new();
        seed(&store, 30).await;

        let spec = QuerySpec::from_params(&QueryParams::parse("name[gte]=camp 10&page=2&limit=5&sort=name")).unwrap();
        let page = advanced_results(&store, "bootcamps", &spec).await.unwrap();
        assert_eq!(page.total, 20);
        assert_eq!(page.count, 5);
        assert_eq!(page.data[0]["name"], json!("camp 15"));
        assert_eq!(page.pagination.prev, Some(Cursor { page: 1, limit: 5 }));
        assert_eq!(page.pagination.next, Some(Cursor { page: 3, limit: 5 }));
    }

    #[tokio::test]
    async fn reference_and_virtual_population() {
        let store = InMemoryDocumentStore::new();
        let camp_id = RecordId::new().to_string();
        store
            .insert(
                "bootcamps",
                doc(json!({"_id": camp_id, "name": "Devworks", "description": "d", "phone": "1"})),
            )
            .await
            .unwrap();
        for title in ["a", "b"] {
            store
                .insert(
                    "courses",
                    doc(json!({"_id": RecordId::new().to_string(), "title": title, "bootcamp": camp_id})),
                )
                .await
                .unwrap();
        }

        let spec = QuerySpec::default().with_populate(Some(Populate::reference(
            "bootcamp",
            "bootcamps",
            &["name", "description"],
        )));
        let courses = advanced_results(&store, "courses", &spec).await.unwrap();
        assert_eq!(
            courses.data[0]["bootcamp"],
            json!({"_id": camp_id, "name": "Devworks", "description": "d"})
        );

        let spec = QuerySpec::default().with_populate(Some(Populate::virtual_field("courses", "courses", "bootcamp")));
        let camps = advanced_results(&store, "bootcamps", &spec).await.unwrap();
        assert_eq!(camps.data[0]["courses"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn projection_dropping_id_still_populates() {
        let store = InMemoryDocumentStore::new();
        let camp_id = RecordId::new().to_string();
        store
            .insert("bootcamps", doc(json!({"_id": camp_id, "name": "Devworks", "phone": "1"})))
            .await
            .unwrap();
        store
            .insert(
                "courses",
                doc(json!({"_id": RecordId::new().to_string(), "title": "a", "bootcamp": camp_id})),
            )
            .await
            .unwrap();

        let spec = QuerySpec::from_params(&QueryParams::parse("select=name,-_id"))
            .unwrap()
            .with_populate(Some(Populate::virtual_field("courses", "courses", "bootcamp")));
        let camps = advanced_results(&store, "bootcamps", &spec).await.unwrap();
        let camp = &camps.data[0];
        assert_eq!(camp["name"], json!("Devworks"));
        assert!(camp.get("_id").is_none());
        assert!(camp.get("phone").is_none());
        assert_eq!(camp["courses"].as_array().unwrap().len(), 1);

        let spec = QuerySpec::from_params(&QueryParams::parse("select=title"))
            .unwrap()
            .with_populate(Some(Populate::reference("bootcamp", "bootcamps", &["name"])));
        let courses = advanced_results(&store, "courses", &spec).await.unwrap();
        assert_eq!(courses.data[0]["bootcamp"], json!({"_id": camp_id, "name": "Devworks"}));
        assert_eq!(courses.data[0]["title"], json!("a"));
    }

    #[tokio::test]
    async fn dangling_reference_becomes_null() {
        let store = InMemoryDocumentStore::new();
        let mut docs = vec![doc(json!({"bootcamp": RecordId::new().to_string()}))];
        populate(&store, &Populate::reference("bootcamp", "bootcamps", &["name"]), &mut docs)
            .await
            .unwrap();
        assert_eq!(docs[0]["bootcamp"], Value::Null);
    }
}
