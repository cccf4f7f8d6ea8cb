//! Route configuration and setup

use crate::constants::{API_BASE, API_PREFIX};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use memeshelf_core::Config;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::ToSchema;

/// Room for the non-file multipart fields on top of the upload limit.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    Ok(build_router(state, config.max_upload_size_bytes()).layer(cors))
}

/// The full router minus CORS.
pub fn build_router(state: Arc<AppState>, max_upload_size_bytes: usize) -> Router<()> {
    let api_routes = Router::new()
        .route("/media", post(handlers::media::upload_media))
        .route(
            "/media/{id}",
            get(handlers::media::get_media).delete(handlers::media::delete_media),
        )
        .route("/media/{id}/file", get(handlers::media::download_media_file))
        .route("/media/{id}/title", put(handlers::media::update_title))
        .route("/media/{id}/tags", put(handlers::media::update_tags))
        .route(
            "/media/{id}/comments",
            get(handlers::comments::list_comments).post(handlers::comments::add_comment),
        )
        .route("/comments/{id}", delete(handlers::comments::delete_comment))
        .route("/feed", get(handlers::feed::get_feed))
        .route("/feed/random", get(handlers::feed::get_random_feed))
        .route("/tags/resolve", get(handlers::tags::resolve_tags))
        .route("/tags/suggestions", get(handlers::tags::tag_suggestions))
        .route(
            "/albums",
            get(handlers::albums::list_albums).post(handlers::albums::create_album),
        )
        .route("/albums/{id}", delete(handlers::albums::delete_album))
        .route("/site", get(handlers::site::get_site));

    let openapi_path = format!("{}/openapi.json", API_BASE);

    Router::new()
        .nest(API_PREFIX, api_routes)
        .route("/health", get(health_check))
        .with_state(state)
        .route(
            &openapi_path,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new(openapi_path.clone()).path("/docs"))
        // Multipart would otherwise stop at axum's 2 MB default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            max_upload_size_bytes.saturating_add(FORM_OVERHEAD_BYTES),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let mut response = HealthCheckResponse {
        status: "healthy".to_string(),
        database: "not_configured".to_string(),
        storage: "unknown".to_string(),
    };
    let mut overall_healthy = true;

    if let Some(pool) = &state.db_pool {
        match tokio::time::timeout(TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await {
            Ok(Ok(_)) => {
                response.database = "healthy".to_string();
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Database health check failed");
                response.database = format!("unhealthy: {}", e);
                overall_healthy = false;
            }
            Err(_) => {
                tracing::error!("Database health check timed out");
                response.database = "timeout".to_string();
                overall_healthy = false;
            }
        }
    }

    // Storage trouble degrades but does not fail health
    match tokio::time::timeout(TIMEOUT, state.storage.exists("health-check-probe")).await {
        Ok(Ok(_)) => {
            response.storage = "healthy".to_string();
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Storage health check warning");
            response.storage = format!("degraded: {}", e);
        }
        Err(_) => {
            tracing::warn!("Storage health check timed out");
            response.storage = "timeout".to_string();
        }
    }

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        response.status = "unhealthy".to_string();
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
