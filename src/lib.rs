use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

use config::Config;
use repository::RecordRepository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn RecordRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Arc<dyn RecordRepository>, config: Config) -> Self {
        Self {
            repo,
            config: Arc::new(config),
        }
    }
}

/// Build the full router: public probes plus the authenticated `/api` routes.
pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    let protected_routes = Router::new()
        // Records
        .route(
            "/api/records",
            get(handlers::records::list_records).post(handlers::records::create_record),
        )
        .route("/api/records/stats", get(handlers::records::get_record_stats))
        .route(
            "/api/records/:id",
            put(handlers::records::update_record).delete(handlers::records::delete_record),
        )
        // Statistics
        .route("/api/health/overview", get(handlers::stats::get_overview))
        .route("/api/health/trends", get(handlers::stats::get_trends))
        // Reports
        .route("/api/reports/summary", get(handlers::reports::get_summary))
        .route("/api/reports/weekly", get(handlers::reports::get_weekly))
        .route(
            "/api/recommendations",
            get(handlers::recommendations::get_recommendations),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
