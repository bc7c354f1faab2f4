use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, multipart::MultipartRejection},
    routing::{get, put},
};
use serde_json::{Value, json};

use devcamper_catalog::{BOOTCAMPS, BootcampInput};
use devcamper_infra::services::bootcamp_courses;

use super::common::{data, with_count};
use super::{courses, reviews};
use crate::app::AppState;
use crate::app::advanced::{AdvancedQuery, AdvancedResults, advanced_results_middleware};
use crate::app::errors::ApiError;
use crate::app::extract::{ApiJson, photo_upload, record_id};
use crate::authz::{PUBLISHERS, require};
use crate::context::PrincipalContext;

/// Multipart framing allowance on top of the configured file size.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router(state: &AppState) -> Router {
    let list_query = AdvancedQuery::new(state.services.store().clone(), BOOTCAMPS, Some(bootcamp_courses()));
    let upload_limit = usize::try_from(state.uploads.max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/",
            get(list)
                .route_layer(axum::middleware::from_fn_with_state(list_query, advanced_results_middleware))
                .post(create),
        )
        .route("/radius/:zipcode/:distance", get(within_radius))
        .route("/:id", get(get_bootcamp).put(update).delete(remove))
        .route(
            "/:id/photo",
            put(upload_photo).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/:id/courses", get(courses::for_bootcamp).post(courses::create))
        .route("/:id/reviews", get(reviews::for_bootcamp).post(reviews::create_for_bootcamp))
}

async fn list(Extension(AdvancedResults(page)): Extension<AdvancedResults>) -> Json<Value> {
    Json(json!(page))
}

async fn get_bootcamp(Extension(state): Extension<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let doc = state.services.bootcamps.get(record_id(&id)?).await?;
    Ok(data(doc))
}

async fn create(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    ApiJson(input): ApiJson<BootcampInput>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, PUBLISHERS)?;
    let doc = state.services.bootcamps.create(principal, input).await?;
    Ok(data(doc))
}

async fn update(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<BootcampInput>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, PUBLISHERS)?;
    let doc = state.services.bootcamps.update(principal, record_id(&id)?, input).await?;
    Ok(data(doc))
}

async fn remove(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, PUBLISHERS)?;
    state.services.bootcamps.remove(principal, record_id(&id)?).await?;
    Ok(data("This record has been successfully removed."))
}

async fn within_radius(
    Extension(state): Extension<AppState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let distance: f64 = distance
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid distance: {distance}")))?;
    let docs = state.services.bootcamps.within_radius(&zipcode, distance).await?;
    Ok(with_count(docs))
}

async fn upload_photo(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, PUBLISHERS)?;
    let id = record_id(&id)?;
    // A body that is not a form simply carries no file.
    let upload = match multipart {
        Ok(multipart) => photo_upload(multipart).await?,
        Err(_) => None,
    };
    let file_name = state
        .services
        .bootcamps
        .upload_photo(principal, id, upload, &state.uploads)
        .await?;
    Ok(data(file_name))
}
