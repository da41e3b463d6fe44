//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from
//! main.rs for better organization and testability.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use arigato_core::Config;
use arigato_db::{AuthorRepository, ImageRepository};
use arigato_storage::AssetStore;
use sqlx::SqlitePool;

use crate::state::{AppState, AuthState, DbState, MediaConfig, SecurityConfig, SessionStore};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    telemetry::init_tracing();

    tracing::info!("Configuration loaded and validated successfully");

    // Setup database
    let pool = database::setup_database(&config).await?;

    // Setup storage
    let store = storage::setup_storage(&config).await?;

    // Assemble state and routes
    let state = build_state(config.clone(), pool, store);
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Build the application state from acquired resources. Shared with the
/// integration test harness, which wires its own pool and storage.
pub fn build_state(config: Config, pool: SqlitePool, store: Arc<dyn AssetStore>) -> Arc<AppState> {
    Arc::new(AppState {
        db: DbState {
            pool: pool.clone(),
            author_repository: AuthorRepository::new(pool.clone()),
            image_repository: ImageRepository::new(pool),
        },
        media: MediaConfig {
            store,
            max_file_size: config.max_file_size_bytes,
            allowed_extensions: config.allowed_extensions.clone(),
            public_prefix: config.public_image_prefix.clone(),
        },
        security: SecurityConfig {
            cors_origins: config.cors_origins.clone(),
        },
        auth: AuthState {
            oauth: config.oauth.clone(),
            http: reqwest::Client::new(),
            sessions: SessionStore::new(),
        },
        config,
    })
}
