//! Bulk import and removal of fixture data.
//!
//! A fixture file holds one collection's documents, either as a JSON array
//! or as newline-delimited JSON objects. Bootcamp fixtures get the same slug
//! and geocoded location a created bootcamp gets.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use devcamper_catalog::collections::ALL;
use devcamper_catalog::{BOOTCAMPS, slugify, timestamp};
use devcamper_core::RecordId;
use devcamper_query::{Document, Filter, ID_FIELD};

use crate::geocoder::{GeocodeError, Geocoder};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Parse { path: PathBuf, line: usize, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error("failed to encode location: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Parse fixture text. Missing `_id` and `createdAt` are filled in.
pub fn parse_documents(path: &Path, text: &str) -> Result<Vec<Document>, FixtureError> {
    let parse_error = |line: usize, message: String| FixtureError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let values: Vec<(usize, Value)> = if text.trim_start().starts_with('[') {
        let items: Vec<Value> = serde_json::from_str(text).map_err(|e| parse_error(e.line(), e.to_string()))?;
        items.into_iter().map(|v| (1, v)).collect()
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| {
                serde_json::from_str(l)
                    .map(|v| (i + 1, v))
                    .map_err(|e| parse_error(i + 1, e.to_string()))
            })
            .collect::<Result<_, _>>()?
    };

    values
        .into_iter()
        .map(|(line, value)| {
            let Value::Object(mut doc) = value else {
                return Err(parse_error(line, "expected a JSON object".to_string()));
            };
            match doc.get(ID_FIELD) {
                None => {
                    doc.insert(ID_FIELD.to_string(), Value::String(RecordId::new().to_string()));
                }
                Some(Value::String(s)) if s.parse::<RecordId>().is_ok() => {}
                Some(other) => return Err(parse_error(line, format!("_id {other} is not a UUID"))),
            }
            doc.entry("createdAt")
                .or_insert_with(|| Value::String(timestamp::format(&Utc::now())));
            Ok(doc)
        })
        .collect()
}

/// Derive `slug` from `name` when absent and replace `address` with its geocoded `location`.
pub async fn prepare_bootcamp(doc: &mut Document, geocoder: &dyn Geocoder) -> Result<(), FixtureError> {
    if !doc.contains_key("slug") {
        if let Some(name) = doc.get("name").and_then(Value::as_str) {
            let slug = slugify(name);
            doc.insert("slug".to_string(), Value::String(slug));
        }
    }

    let Some(Value::String(address)) = doc.remove("address") else {
        return Ok(());
    };
    match geocoder.geocode(&address).await? {
        Some(location) => {
            doc.insert("location".to_string(), serde_json::to_value(location)?);
        }
        None => warn!(%address, "fixture address could not be geocoded; bootcamp stored without location"),
    }
    Ok(())
}

/// Import `<collection>.json` from `dir` for every collection. Missing files are skipped.
pub async fn import(store: &dyn DocumentStore, geocoder: &dyn Geocoder, dir: &Path) -> Result<usize, FixtureError> {
    let mut total = 0;
    for collection in ALL {
        let path = dir.join(format!("{collection}.json"));
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "fixture file missing; skipped");
                continue;
            }
            Err(source) => return Err(FixtureError::Io { path, source }),
        };
        let mut docs = parse_documents(&path, &text)?;
        if collection == BOOTCAMPS {
            for doc in docs.iter_mut() {
                prepare_bootcamp(doc, geocoder).await?;
            }
        }
        let inserted = store.insert_many(collection, docs).await?;
        info!(collection, inserted, "fixtures imported");
        total += inserted;
    }
    Ok(total)
}

/// Remove every document of every collection.
pub async fn destroy(store: &dyn DocumentStore) -> Result<u64, FixtureError> {
    let mut total = 0;
    for collection in ALL {
        let removed = store.delete_many(collection, &Filter::all()).await?;
        info!(collection, removed, "fixtures destroyed");
        total += removed;
    }
    Ok(total)
}
