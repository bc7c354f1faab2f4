//! User administration. Every route is admin-only.

use axum::{
    Extension, Json, Router,
    extract::{Path, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use serde_json::{Value, json};

use devcamper_catalog::{USERS, UserInput};

use super::common::data;
use crate::app::AppState;
use crate::app::advanced::{AdvancedQuery, AdvancedResults, advanced_results_middleware};
use crate::app::errors::ApiError;
use crate::app::extract::{ApiJson, record_id};
use crate::authz::{ADMINS, require};
use crate::context::PrincipalContext;

pub fn router(state: &AppState) -> Router {
    let list_query = AdvancedQuery::new(state.services.store().clone(), USERS, None);

    Router::new()
        .route(
            "/",
            get(list)
                .route_layer(axum::middleware::from_fn_with_state(list_query, advanced_results_middleware))
                .post(create),
        )
        .route("/:id", get(get_user).put(update).delete(remove))
        .route_layer(axum::middleware::from_fn(admin_only))
}

/// Runs before the list query so non-admins never trigger it.
async fn admin_only(ctx: PrincipalContext, req: Request, next: Next) -> Result<Response, ApiError> {
    require(&ctx, ADMINS)?;
    Ok(next.run(req).await)
}

async fn list(Extension(AdvancedResults(page)): Extension<AdvancedResults>) -> Json<Value> {
    Json(json!(page))
}

async fn create(
    Extension(state): Extension<AppState>,
    ApiJson(input): ApiJson<UserInput>,
) -> Result<Json<Value>, ApiError> {
    let doc = state.services.users.create(input).await?;
    Ok(data(doc))
}

async fn get_user(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let doc = state.services.users.get(record_id(&id)?).await?;
    Ok(data(doc))
}

async fn update(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UserInput>,
) -> Result<Json<Value>, ApiError> {
    let doc = state.services.users.update(record_id(&id)?, input).await?;
    Ok(data(doc))
}

async fn remove(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.services.users.remove(record_id(&id)?).await?;
    Ok(data(json!({})))
}
