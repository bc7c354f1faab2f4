//! Advanced-results middleware for list routes.
//!
//! Runs the list query for the route's collection before the handler and
//! attaches the finished page to the request; the handler only responds
//! with it.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use devcamper_core::DomainError;
use devcamper_infra::{DocumentStore, advanced_results};
use devcamper_query::{Document, Paginated, Populate, QueryParams, QuerySpec};

use super::errors::ApiError;

/// Collection and population for one list route.
#[derive(Clone)]
pub struct AdvancedQuery {
    store: Arc<dyn DocumentStore>,
    collection: &'static str,
    populate: Option<Populate>,
}

impl AdvancedQuery {
    pub fn new(store: Arc<dyn DocumentStore>, collection: &'static str, populate: Option<Populate>) -> Self {
        Self {
            store,
            collection,
            populate,
        }
    }
}

/// Page produced by the middleware, read by the list handler.
#[derive(Debug, Clone)]
pub struct AdvancedResults(pub Paginated<Document>);

pub async fn advanced_results_middleware(
    State(query): State<AdvancedQuery>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let params = QueryParams::parse(req.uri().query().unwrap_or(""));
    let spec = QuerySpec::from_params(&params)
        .map_err(DomainError::from)?
        .with_populate(query.populate.clone());

    let page = advanced_results(query.store.as_ref(), query.collection, &spec).await?;
    debug!(collection = query.collection, total = page.total, count = page.count, "advanced results");

    req.extensions_mut().insert(AdvancedResults(page));
    Ok(next.run(req).await)
}
