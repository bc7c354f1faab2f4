use axum::Router;

use super::AppState;

pub mod bootcamps;
pub mod common;
pub mod courses;
pub mod reviews;
pub mod system;
pub mod users;

/// Mount point of the versioned API.
pub const API_PREFIX: &str = "/api/v1";

/// Every `/api/v1` resource.
pub fn router(state: &AppState) -> Router {
    Router::new()
        .nest("/bootcamps", bootcamps::router(state))
        .nest("/courses", courses::router(state))
        .nest("/reviews", reviews::router(state))
        .nest("/users", users::router(state))
}
