//! Postgres-backed document store.
//!
//! All collections share one `documents` table; each record's JSON lives in
//! `body` (including its `_id`). Unique indexes are partial expression
//! indexes scoped by `collection`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `DuplicateKey` |
//! | Database (other) | Any other | `Backend` |
//! | Other | N/A | `Backend` |

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use tracing::{Span, instrument};

use devcamper_catalog::UniqueIndex;
use devcamper_core::RecordId;
use devcamper_query::document::{record_id, set_path};
use devcamper_query::{Document, Filter};

use super::sql::{self, SqlBuilder, SqlParam};
use super::{DocumentStore, FindOptions, StoreError};
use crate::geo::GeoPoint;

#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
    /// Index name → fields, for reporting unique violations.
    indexes: Arc<RwLock<HashMap<String, UniqueIndex>>>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            indexes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Connect and create the `documents` table if needed.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Backend(format!("connect failed: {e}")))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(sql::SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| self.map_sqlx_error("ensure_schema", "documents", e))?;
        Ok(())
    }

    fn map_sqlx_error(&self, operation: &str, collection: &str, err: sqlx::Error) -> StoreError {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some("23505") {
                    let fields = db_err
                        .constraint()
                        .and_then(|name| self.indexes.read().ok()?.get(name).copied())
                        .map(|ix| ix.fields.iter().map(|f| f.to_string()).collect())
                        .unwrap_or_default();
                    return StoreError::DuplicateKey {
                        collection: collection.to_string(),
                        fields,
                    };
                }
                StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
            }
            other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
        }
    }
}

fn bind_all<'q>(mut query: Query<'q, Postgres, PgArguments>, params: &'q [SqlParam]) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Text(s) => query.bind(s.as_str()),
            SqlParam::TextArray(v) => query.bind(v.as_slice()),
            SqlParam::Int(i) => query.bind(*i),
            SqlParam::Float(f) => query.bind(*f),
            SqlParam::Bool(b) => query.bind(*b),
        };
    }
    query
}

fn body_of(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    let body: Value = row
        .try_get("body")
        .map_err(|e| StoreError::Corrupt(format!("failed to read body column: {e}")))?;
    match body {
        Value::Object(doc) => Ok(doc),
        other => Err(StoreError::Corrupt(format!("body is not an object: {other}"))),
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self), fields(collection = index.collection), err)]
    async fn ensure_unique_index(&self, index: UniqueIndex) -> Result<(), StoreError> {
        let (name, ddl) = sql::unique_index_ddl(&index);
        sqlx::query(&ddl)
            .execute(&*self.pool)
            .await
            .map_err(|e| self.map_sqlx_error("ensure_unique_index", index.collection, e))?;
        if let Ok(mut indexes) = self.indexes.write() {
            indexes.insert(name, index);
        }
        Ok(())
    }

    #[instrument(skip(self, doc), fields(id = tracing::field::Empty), err)]
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        let id = record_id(&doc).ok_or(StoreError::MissingId)?;
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id.as_uuid())
            .bind(Value::Object(doc.clone()))
            .execute(&*self.pool)
            .await
            .map_err(|e| self.map_sqlx_error("insert", collection, e))?;
        Span::current().record("id", tracing::field::display(id));
        Ok(doc)
    }

    #[instrument(skip(self, docs), fields(count = docs.len()), err)]
    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<usize, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| self.map_sqlx_error("insert_many", collection, e))?;
        let mut inserted = 0;
        for doc in docs {
            let id = record_id(&doc).ok_or(StoreError::MissingId)?;
            sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
                .bind(collection)
                .bind(id.as_uuid())
                .bind(Value::Object(doc))
                .execute(&mut *tx)
                .await
                .map_err(|e| self.map_sqlx_error("insert_many", collection, e))?;
            inserted += 1;
        }
        tx.commit()
            .await
            .map_err(|e| self.map_sqlx_error("insert_many", collection, e))?;
        Ok(inserted)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn find_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| self.map_sqlx_error("find_by_id", collection, e))?;
        row.as_ref().map(body_of).transpose()
    }

    #[instrument(skip(self, filter, options), fields(returned = tracing::field::Empty), err)]
    async fn find(&self, collection: &str, filter: &Filter, options: &FindOptions) -> Result<Vec<Document>, StoreError> {
        let mut b = SqlBuilder::new(collection);
        let where_sql = sql::where_clause(&mut b, filter);
        let order_sql = sql::order_by(&mut b, &options.sort);
        let offset = b.push(SqlParam::Int(i64::try_from(options.skip).unwrap_or(i64::MAX)));
        let window = match options.limit {
            Some(limit) => format!(" LIMIT {}", b.push(SqlParam::Int(i64::try_from(limit).unwrap_or(i64::MAX)))),
            None => String::new(),
        };
        let statement = format!("SELECT body FROM documents WHERE {where_sql} {order_sql} OFFSET {offset}{window}");

        let params = b.into_params();
        let rows = bind_all(sqlx::query(&statement), &params)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| self.map_sqlx_error("find", collection, e))?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in &rows {
            let doc = body_of(row)?;
            docs.push(match &options.projection {
                Some(p) => p.apply(&doc),
                None => doc,
            });
        }
        Span::current().record("returned", docs.len());
        Ok(docs)
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut b = SqlBuilder::new(collection);
        let statement = format!("SELECT COUNT(*) AS n FROM documents WHERE {}", sql::where_clause(&mut b, filter));
        let params = b.into_params();
        let row = bind_all(sqlx::query(&statement), &params)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| self.map_sqlx_error("count", collection, e))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| StoreError::Corrupt(format!("failed to read count: {e}")))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    #[instrument(skip(self, changes), fields(id = %id), err)]
    async fn update_by_id(
        &self,
        collection: &str,
        id: RecordId,
        changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        // Read-modify-write under a row lock so dotted keys nest exactly as
        // they do in memory.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| self.map_sqlx_error("begin_transaction", collection, e))?;

        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE")
            .bind(collection)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| self.map_sqlx_error("update_by_id", collection, e))?;
        let Some(row) = row else {
            tx.rollback()
                .await
                .map_err(|e| self.map_sqlx_error("rollback", collection, e))?;
            return Ok(None);
        };

        let mut updated = body_of(&row)?;
        for (path, value) in changes {
            set_path(&mut updated, &path, value);
        }

        sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .bind(Value::Object(updated.clone()))
            .execute(&mut *tx)
            .await
            .map_err(|e| self.map_sqlx_error("update_by_id", collection, e))?;

        tx.commit()
            .await
            .map_err(|e| self.map_sqlx_error("commit_transaction", collection, e))?;
        Ok(Some(updated))
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete_by_id(&self, collection: &str, id: RecordId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| self.map_sqlx_error("delete_by_id", collection, e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, filter), err)]
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut b = SqlBuilder::new(collection);
        let statement = format!("DELETE FROM documents WHERE {}", sql::where_clause(&mut b, filter));
        let params = b.into_params();
        let result = bind_all(sqlx::query(&statement), &params)
            .execute(&*self.pool)
            .await
            .map_err(|e| self.map_sqlx_error("delete_many", collection, e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn find_within_sphere(
        &self,
        collection: &str,
        path: &str,
        center: GeoPoint,
        radius: f64,
    ) -> Result<Vec<Document>, StoreError> {
        let mut b = SqlBuilder::new(collection);
        let statement = format!(
            "SELECT body FROM documents WHERE {} ORDER BY seq ASC",
            sql::within_sphere(&mut b, path, center, radius)
        );
        let params = b.into_params();
        let rows = bind_all(sqlx::query(&statement), &params)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| self.map_sqlx_error("find_within_sphere", collection, e))?;
        rows.iter().map(body_of).collect()
    }
}
