//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p arigato-api`. Each test gets an
//! isolated SQLite database file and upload directory under a temp dir.

pub mod multipart;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use arigato_api::setup;
use axum_test::TestServer;
use arigato_core::{Config, OAuthConfig};
use arigato_storage::{AssetStore, LocalAssetStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;

/// Test application: server plus owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config(database_url: String, upload_dir: &std::path::Path, oauth: Option<OAuthConfig>) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        environment: "test".to_string(),
        database_url,
        db_max_connections: 1,
        db_timeout_seconds: 30,
        upload_dir: upload_dir.display().to_string(),
        public_image_prefix: "/img/thanks".to_string(),
        max_file_size_bytes: 10 * 1024 * 1024,
        allowed_extensions: vec![
            "jpg".to_string(),
            "jpeg".to_string(),
            "png".to_string(),
            "gif".to_string(),
            "webp".to_string(),
        ],
        frontend_url: "http://localhost:3000".to_string(),
        oauth,
    }
}

/// OAuth settings pointing at a fictional provider; only used for the
/// redirect and session checks, never actually contacted.
pub fn test_oauth_config() -> OAuthConfig {
    OAuthConfig {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        authorize_url: "https://idp.example/authorize".to_string(),
        token_url: "https://idp.example/token".to_string(),
        userinfo_url: "https://idp.example/userinfo".to_string(),
        redirect_uri: "http://localhost:5000/callback".to_string(),
        scope: "openid profile".to_string(),
    }
}

async fn setup_with(oauth: Option<OAuthConfig>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let upload_dir = temp_dir.path().join("uploads");

    let config = test_config(format!("sqlite:{}", db_path.display()), &upload_dir, oauth);

    let options = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid test database URL")
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let store: Arc<dyn AssetStore> = Arc::new(
        LocalAssetStore::new(upload_dir.clone(), config.public_image_prefix.clone())
            .await
            .expect("Failed to create local storage"),
    );

    let state = setup::build_state(config.clone(), pool, store);
    let router = setup::routes::setup_routes(&config, state).expect("Failed to build router");

    TestApp {
        server: TestServer::new(router).expect("Failed to start test server"),
        upload_dir,
        _temp_dir: temp_dir,
    }
}

/// Setup a test app with OAuth login configured.
pub async fn setup_test_app() -> TestApp {
    setup_with(Some(test_oauth_config())).await
}

/// Setup a test app with the OAuth login proxy disabled.
pub async fn setup_test_app_without_oauth() -> TestApp {
    setup_with(None).await
}
