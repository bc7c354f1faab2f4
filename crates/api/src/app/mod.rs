//! HTTP application wiring (Axum router + service wiring).
//!
//! - `routes/`: handlers, one file per resource
//! - `advanced.rs`: list query middleware
//! - `extract.rs`: JSON, id and multipart extraction
//! - `errors.rs`: the error responder and error logging
//! - `rate_limit.rs`: per-client request budget

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Extension, Router,
    http::{HeaderName, HeaderValue, header},
    routing::get,
};
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use devcamper_auth::Hs256JwtValidator;
use devcamper_infra::{
    DocumentStore, Geocoder, InMemoryDocumentStore, PostgresDocumentStore, Services, StaticGeocoder, UploadSettings,
};

use crate::config::AppConfig;
use crate::middleware;

pub mod advanced;
pub mod errors;
pub mod extract;
pub mod rate_limit;
pub mod routes;

/// Shared by every handler through an `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub uploads: UploadSettings,
}

/// Connect the configured backends and build the router.
pub async fn build_app(config: Arc<AppConfig>) -> anyhow::Result<Router> {
    let store = connect_store(&config).await?;
    let geocoder = load_geocoder(&config)?;

    let services = Services::new(store, geocoder);
    services.ensure_indexes().await.context("Failed to create unique indexes")?;

    Ok(build_router(config, services))
}

/// Postgres when `database_url` is set, otherwise an in-memory store.
pub async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresDocumentStore::connect(url)
                .await
                .context("Failed to connect to Postgres")?;
            info!("using postgres document store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("database_url not set; records are kept in memory only");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
    }
}

/// Geocoder over the configured fixture table, or an empty one.
pub fn load_geocoder(config: &AppConfig) -> anyhow::Result<Arc<dyn Geocoder>> {
    let geocoder = match &config.geocoder_fixtures {
        Some(path) => {
            let geocoder = StaticGeocoder::load(path)
                .with_context(|| format!("Failed to load geocoder fixtures from {}", path.display()))?;
            info!(locations = geocoder.len(), "geocoder fixtures loaded");
            geocoder
        }
        None => {
            warn!("geocoder_fixtures not set; addresses will not be resolved");
            StaticGeocoder::default()
        }
    };
    Ok(Arc::new(geocoder))
}

/// Build the full HTTP router over ready services.
pub fn build_router(config: Arc<AppConfig>, services: Services) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let state = AppState {
        services,
        uploads: UploadSettings {
            directory: config.file_upload_path.clone(),
            max_bytes: config.max_file_upload,
        },
    };
    let limiter = rate_limit::RateLimiter::new(&config.rate_limit);

    // Layers listed innermost first.
    let app = Router::new()
        .route("/health", get(routes::system::health))
        .nest(routes::API_PREFIX, routes::router(&state))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(Extension(state))
        .layer(axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware))
        .layer(axum::middleware::from_fn_with_state(limiter, rate_limit::rate_limit_middleware))
        .layer(CorsLayer::permissive());

    let mut app = with_security_headers(app)
        .layer(axum::middleware::from_fn_with_state(config.clone(), errors::log_errors));

    if config.environment.is_development() {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.layer(CatchPanicLayer::custom(errors::panic_response))
}

/// Security headers, set only when a handler has not set them.
fn with_security_headers(router: Router) -> Router {
    router
        .layer(default_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(default_header(header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .layer(default_header(header::X_DNS_PREFETCH_CONTROL, "off"))
        .layer(default_header(header::REFERRER_POLICY, "no-referrer"))
        .layer(default_header(
            header::STRICT_TRANSPORT_SECURITY,
            "max-age=15552000; includeSubDomains",
        ))
}

fn default_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}
