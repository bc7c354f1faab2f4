//! Per-request identity.

use axum::{extract::FromRequestParts, http::request::Parts};

use devcamper_auth::{Principal, PrincipalId, Role};

use crate::app::errors::ApiError;

/// Message for protected routes reached without a valid token.
pub const NOT_AUTHORIZED: &str = "Not authorized to access this route";

/// Authenticated principal for a request.
///
/// Inserted by the auth middleware when the request carries a valid token;
/// extracting it on a request without one is a 401.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, role: Role) -> Self {
        Self {
            principal: Principal::new(principal_id, role),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for PrincipalContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<PrincipalContext>()
            .copied()
            .ok_or_else(|| ApiError::unauthorized(NOT_AUTHORIZED))
    }
}
