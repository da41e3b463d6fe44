//! Route configuration and setup.

use std::sync::Arc;

use anyhow::Result;
use arigato_core::Config;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>> {
    let cors = setup_cors(config)?;

    let api_routes = Router::new()
        .route(
            "/images",
            get(handlers::image_get::list_images).post(handlers::image_create::add_image),
        )
        .route(
            "/images/{id}",
            get(handlers::image_get::get_image)
                .put(handlers::image_update::update_image)
                .delete(handlers::image_delete::delete_image),
        )
        .route("/authors", get(handlers::authors::list_authors))
        .route("/login", get(handlers::login::login))
        .route("/callback", get(handlers::login::callback))
        .route("/userinfo", get(handlers::login::userinfo))
        .route("/health", get(health))
        .route("/openapi.json", get(openapi_spec))
        .with_state(state);

    // The whole multipart body may carry several files; individual files are
    // additionally checked per-field against the configured maximum.
    let body_limit = config.max_file_size_bytes.saturating_mul(8);

    let app = api_routes
        .merge(utoipa_rapidoc::RapiDoc::new("/openapi.json").path("/docs"))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

fn setup_cors(config: &Config) -> Result<CorsLayer> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods(methods)
            .allow_headers(Any)
    };

    Ok(cors)
}
