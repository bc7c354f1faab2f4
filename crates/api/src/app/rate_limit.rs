//! Per-client fixed-window rate limiting.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::errors::ApiError;
use crate::config::RateLimitConfig;

pub const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later.";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Counts requests per client address in fixed windows.
///
/// Clients without a known address share a single window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: Arc<Mutex<HashMap<Option<IpAddr>, Window>>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record one request; `false` once the client has used up its window.
    pub fn check(&self, client: Option<IpAddr>, now: Instant) -> bool {
        let Ok(mut clients) = self.clients.lock() else {
            // Poisoned by a panicking holder; let the request through.
            return true;
        };

        clients.retain(|_, w| now.duration_since(w.started) < self.window);

        let entry = clients.entry(client).or_insert(Window { started: now, hits: 0 });
        entry.hits = entry.hits.saturating_add(1);
        entry.hits <= self.max_requests
    }
}

pub async fn rate_limit_middleware(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if !limiter.check(client, Instant::now()) {
        warn!(client = ?client, "rate limit exceeded");
        return ApiError::new(StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS).into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            window_secs: 600,
            max_requests,
        })
    }

    #[test]
    fn allows_up_to_the_limit_per_client() {
        let limiter = limiter(2);
        let now = Instant::now();
        let a = Some(IpAddr::from([10, 0, 0, 1]));
        let b = Some(IpAddr::from([10, 0, 0, 2]));

        assert!(limiter.check(a, now));
        assert!(limiter.check(a, now));
        assert!(!limiter.check(a, now));
        assert!(limiter.check(b, now));
    }

    #[test]
    fn window_resets_after_it_elapses() {
        let limiter = limiter(1);
        let start = Instant::now();
        let a = Some(IpAddr::from([10, 0, 0, 1]));

        assert!(limiter.check(a, start));
        assert!(!limiter.check(a, start + Duration::from_secs(599)));
        assert!(limiter.check(a, start + Duration::from_secs(600)));
    }
}
