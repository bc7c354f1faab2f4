use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use devcamper_auth::JwtValidator;

use crate::context::PrincipalContext;

/// Cookie carrying the token when no `Authorization` header is sent.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Attach a [`PrincipalContext`] when the request carries a valid token.
///
/// Requests without one pass through untouched; protected handlers reject
/// them when they extract the context.
pub async fn auth_middleware(State(state): State<AuthState>, mut req: Request, next: Next) -> Response {
    if let Some(token) = extract_token(req.headers()) {
        match state.jwt.validate(token, Utc::now()) {
            Ok(claims) => {
                req.extensions_mut().insert(PrincipalContext::new(claims.sub, claims.role));
            }
            Err(e) => debug!(error = %e, "ignoring invalid token"),
        }
    }

    next.run(req).await
}

/// Bearer header first, then the `token` cookie.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    extract_bearer(headers).or_else(|| extract_cookie(headers, TOKEN_COOKIE))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty() && *value != "none")
}
