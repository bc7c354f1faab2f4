use axum::{
    Extension, Json, Router,
    extract::Path,
    routing::get,
};
use serde_json::{Value, json};

use devcamper_catalog::{COURSES, CourseInput};
use devcamper_infra::services::bootcamp_summary;

use super::common::{data, with_count};
use crate::app::AppState;
use crate::app::advanced::{AdvancedQuery, AdvancedResults, advanced_results_middleware};
use crate::app::errors::ApiError;
use crate::app::extract::{ApiJson, record_id};
use crate::authz::{PUBLISHERS, require};
use crate::context::PrincipalContext;

pub fn router(state: &AppState) -> Router {
    let list_query = AdvancedQuery::new(state.services.store().clone(), COURSES, Some(bootcamp_summary()));

    Router::new()
        .route(
            "/",
            get(list).route_layer(axum::middleware::from_fn_with_state(list_query, advanced_results_middleware)),
        )
        .route("/:id", get(get_course).put(update).delete(remove))
}

async fn list(Extension(AdvancedResults(page)): Extension<AdvancedResults>) -> Json<Value> {
    Json(json!(page))
}

/// `GET /bootcamps/:id/courses`
pub(super) async fn for_bootcamp(
    Extension(state): Extension<AppState>,
    Path(bootcamp): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let docs = state.services.courses.list_for_bootcamp(record_id(&bootcamp)?).await?;
    Ok(with_count(docs))
}

/// `POST /bootcamps/:id/courses`
pub(super) async fn create(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    Path(bootcamp): Path<String>,
    ApiJson(input): ApiJson<CourseInput>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, PUBLISHERS)?;
    let doc = state
        .services
        .courses
        .create(principal, record_id(&bootcamp)?, input)
        .await?;
    Ok(data(doc))
}

async fn get_course(Extension(state): Extension<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let doc = state.services.courses.get(record_id(&id)?).await?;
    Ok(data(doc))
}

async fn update(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CourseInput>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, PUBLISHERS)?;
    let doc = state.services.courses.update(principal, record_id(&id)?, input).await?;
    Ok(data(doc))
}

async fn remove(
    Extension(state): Extension<AppState>,
    ctx: PrincipalContext,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let principal = require(&ctx, PUBLISHERS)?;
    state.services.courses.remove(principal, record_id(&id)?).await?;
    Ok(data("This course has been successfully deleted"))
}
