//! Behaviour every `DocumentStore` backend must share.
//!
//! The in-memory store always runs the suite. The Postgres store runs it when
//! `DATABASE_URL` points at a reachable database.

use serde_json::{Value, json};

use devcamper_catalog::UniqueIndex;
use devcamper_core::RecordId;
use devcamper_infra::geo::{GeoPoint, miles_to_radians};
use devcamper_infra::{DocumentStore, FindOptions, InMemoryDocumentStore, PostgresDocumentStore, StoreError};
use devcamper_query::document::record_id;
use devcamper_query::{Document, Filter, Projection, QueryParams, SortKey};

const CAMPS: &str = "contract_camps";
const COURSES: &str = "contract_courses";
const USERS: &str = "contract_users";

fn doc(value: Value) -> Document {
    let mut doc = value.as_object().cloned().unwrap();
    doc.insert("_id".into(), json!(RecordId::new().to_string()));
    doc
}

fn filter(query: &str) -> Filter {
    Filter::from_params(&QueryParams::parse(query)).unwrap()
}

fn names(docs: &[Document]) -> Vec<Value> {
    docs.iter().map(|d| d.get("name").cloned().unwrap_or(Value::Null)).collect()
}

async fn reset(store: &dyn DocumentStore) {
    for collection in [CAMPS, COURSES, USERS] {
        store.delete_many(collection, &Filter::all()).await.unwrap();
    }
}

async fn dotted_update_nests(store: &dyn DocumentStore) {
    let camp = store
        .insert(
            CAMPS,
            doc(json!({"name": "Devworks", "location": {"zipcode": "02215", "city": "Boston"}})),
        )
        .await
        .unwrap();
    let id = record_id(&camp).unwrap();

    let mut changes = Document::new();
    changes.insert("location.zipcode".into(), json!("02118"));
    changes.insert("housing".into(), json!(true));
    let updated = store.update_by_id(CAMPS, id, changes).await.unwrap().unwrap();

    assert_eq!(updated["location"], json!({"zipcode": "02118", "city": "Boston"}));
    assert_eq!(updated["housing"], json!(true));
    assert!(!updated.contains_key("location.zipcode"));
    assert_eq!(store.find_by_id(CAMPS, id).await.unwrap(), Some(updated));

    assert_eq!(store.update_by_id(CAMPS, RecordId::new(), Document::new()).await.unwrap(), None);
}

async fn typed_comparisons(store: &dyn DocumentStore) {
    let docs = vec![
        doc(json!({"name": "a", "averageCost": 900, "careers": ["Business"], "housing": true})),
        doc(json!({"name": "b", "averageCost": 10000, "careers": ["Web Development", "Other"], "housing": false})),
        doc(json!({"name": "c", "averageCost": 12000, "careers": ["UI/UX"]})),
    ];
    assert_eq!(store.insert_many(CAMPS, docs).await.unwrap(), 3);
    let by_name = FindOptions {
        sort: vec![SortKey::asc("name")],
        ..FindOptions::default()
    };

    // 10000 and 12000 are greater than 9000 numerically, not lexically.
    let found = store.find(CAMPS, &filter("averageCost[gt]=9000"), &by_name).await.unwrap();
    assert_eq!(names(&found), vec![json!("b"), json!("c")]);

    let found = store.find(CAMPS, &filter("averageCost[lte]=10000"), &by_name).await.unwrap();
    assert_eq!(names(&found), vec![json!("a"), json!("b")]);

    let found = store.find(CAMPS, &filter("careers[in]=Business,Other"), &by_name).await.unwrap();
    assert_eq!(names(&found), vec![json!("a"), json!("b")]);

    assert_eq!(store.count(CAMPS, &filter("housing=true")).await.unwrap(), 1);
    assert_eq!(store.count(CAMPS, &filter("averageCost[gt]=cheap")).await.unwrap(), 0);
}

async fn mixed_type_sort(store: &dyn DocumentStore) {
    let ranks = [json!(3), json!("b"), Value::Null, json!(1), json!("a"), json!(true)];
    for (i, rank) in ranks.into_iter().enumerate() {
        let mut d = doc(json!({"name": i}));
        if !rank.is_null() {
            d.insert("rank".into(), rank);
        }
        store.insert(COURSES, d).await.unwrap();
    }

    let sorted = |key: SortKey| FindOptions {
        sort: vec![key],
        ..FindOptions::default()
    };
    let asc = store.find(COURSES, &Filter::all(), &sorted(SortKey::asc("rank"))).await.unwrap();
    assert_eq!(names(&asc), vec![json!(2), json!(3), json!(0), json!(4), json!(1), json!(5)]);

    let desc = store.find(COURSES, &Filter::all(), &sorted(SortKey::desc("rank"))).await.unwrap();
    assert_eq!(names(&desc), vec![json!(5), json!(1), json!(4), json!(0), json!(3), json!(2)]);

    let window = FindOptions {
        sort: vec![SortKey::asc("rank")],
        skip: 1,
        limit: Some(2),
        projection: Projection::parse("name,-_id"),
    };
    let page = store.find(COURSES, &Filter::all(), &window).await.unwrap();
    assert_eq!(page, vec![doc_without_id(json!({"name": 3})), doc_without_id(json!({"name": 0}))]);
}

fn doc_without_id(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

async fn unique_violation_is_duplicate_key(store: &dyn DocumentStore) {
    store
        .ensure_unique_index(UniqueIndex {
            collection: USERS,
            fields: &["email"],
        })
        .await
        .unwrap();

    store.insert(USERS, doc(json!({"email": "a@example.com"}))).await.unwrap();
    let other = store.insert(USERS, doc(json!({"email": "b@example.com"}))).await.unwrap();

    let err = store.insert(USERS, doc(json!({"email": "a@example.com"}))).await.unwrap_err();
    assert!(
        matches!(&err, StoreError::DuplicateKey { fields, .. } if fields == &["email".to_string()]),
        "{err}"
    );

    let mut changes = Document::new();
    changes.insert("email".into(), json!("a@example.com"));
    let err = store
        .update_by_id(USERS, record_id(&other).unwrap(), changes)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey { .. }), "{err}");
    assert_eq!(store.count(USERS, &Filter::all()).await.unwrap(), 2);
}

async fn deletes_and_radius(store: &dyn DocumentStore) {
    let boston = store
        .insert(
            CAMPS,
            doc(json!({"name": "boston", "location": {"coordinates": [-71.104028, 42.350846]}})),
        )
        .await
        .unwrap();
    store
        .insert(
            CAMPS,
            doc(json!({"name": "los angeles", "location": {"coordinates": [-118.243683, 34.052235]}})),
        )
        .await
        .unwrap();
    let boston_id = record_id(&boston).unwrap();
    for title in ["x", "y"] {
        store
            .insert(COURSES, doc(json!({"title": title, "bootcamp": boston_id.to_string()})))
            .await
            .unwrap();
    }

    let near = store
        .find_within_sphere(
            CAMPS,
            "location.coordinates",
            GeoPoint::new(-71.06, 42.36),
            miles_to_radians(10.0),
        )
        .await
        .unwrap();
    assert_eq!(names(&near), vec![json!("boston")]);

    let removed = store
        .delete_many(COURSES, &Filter::eq("bootcamp", boston_id.to_string()))
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(store.delete_by_id(CAMPS, boston_id).await.unwrap());
    assert!(!store.delete_by_id(CAMPS, boston_id).await.unwrap());
    assert_eq!(store.count(CAMPS, &Filter::all()).await.unwrap(), 1);
}

async fn run_contract(store: &dyn DocumentStore) {
    reset(store).await;
    dotted_update_nests(store).await;
    reset(store).await;
    typed_comparisons(store).await;
    reset(store).await;
    mixed_type_sort(store).await;
    reset(store).await;
    unique_violation_is_duplicate_key(store).await;
    reset(store).await;
    deletes_and_radius(store).await;
    reset(store).await;
}

#[tokio::test]
async fn in_memory_store_honours_contract() {
    run_contract(&InMemoryDocumentStore::new()).await;
}

#[tokio::test]
async fn postgres_store_honours_contract() {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping Postgres store contract");
        return;
    };
    let store = PostgresDocumentStore::connect(&url).await.unwrap();
    run_contract(&store).await;
}
