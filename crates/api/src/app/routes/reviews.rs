use axum::{
    Extension, Json, Router,
    extract::Path,
    routing::get,
};
use serde_json::{Value, json};

use devcamper_catalog::{REVIEWS, ReviewInput};
use devcamper_infra::services::bootcamp_summary;

use super::common::{data, with_count};
use crate::app::AppState;
use crate::app::advanced::{AdvancedQuery, AdvancedResults, advanced_results_middleware};
use crate::app::errors::ApiError;
use crate::app::extract::{ApiJson, record_id};
use crate::authz::{REVIEWERS, require};
use crate::context::PrincipalContext;

pub fn router(state: &AppState) -> Router {
    let list_query = AdvancedQuery::new(state.services.store().clone(), REVIEWS, Some(bootcamp_summary()));

    Router::new()
        .route(
            "/",
            get(list)
                .route_layer(axum::middleware::from_fn_with_state(list_query, advanced_results_middleware))
                .post(create),
        )
        .route("/:id", get(get_review).put(update).delete(remove))
}

async fn list(Extension(AdvancedResults(page)): Extension<AdvancedResults>) -> Json<Value> {
    Json(json!(page))
}

/// `GET /bootcamps/:id/reviews`
pub(super) async fn for_bootcamp(
    Extension(state): Extension<AppState>,
    Path(bootcamp): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let docs = state.services.reviews.list_for_bootcamp(record_id(&bootcamp)?).await?;
    Ok(with_count(docs))
}

/// `POST /bootcamps/:id/reviews`
pub(super) async fn create_for_bootcamp(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    Path(bootcamp): Path<String>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, REVIEWERS)?;
    let doc = state
        .services
        .reviews
        .create(principal, Some(record_id(&bootcamp)?), input)
        .await?;
    Ok(data(doc))
}

/// `POST /reviews`: the bootcamp comes from the body.
async fn create(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    ApiJson(input): ApiJson<ReviewInput>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, REVIEWERS)?;
    let doc = state.services.reviews.create(principal, None, input).await?;
    Ok(data(doc))
}

async fn get_review(Extension(state): Extension<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let doc = state.services.reviews.get(record_id(&id)?).await?;
    Ok(data(doc))
}

async fn update(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, REVIEWERS)?;
    let doc = state.services.reviews.update(principal, record_id(&id)?, input).await?;
    Ok(data(doc))
}

async fn remove(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, REVIEWERS)?;
    state.services.reviews.remove(principal, record_id(&id)?).await?;
    Ok(data(json!({})))
}
