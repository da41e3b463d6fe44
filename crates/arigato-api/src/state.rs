//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what
//! they need via Axum's `FromRef`, and to avoid a single god object. All
//! handles are injected at construction; there is no global mutable state.

use std::collections::HashMap;
use std::sync::Arc;

use arigato_core::{AppError, Config, OAuthConfig};
use arigato_db::{AuthorRepository, ImageRepository};
use arigato_storage::AssetStore;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use uuid::Uuid;

// ----- Sub-state types -----

/// Database pool and repositories.
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub author_repository: AuthorRepository,
    pub image_repository: ImageRepository,
}

/// Asset storage plus upload limits and allowlists.
#[derive(Clone)]
pub struct MediaConfig {
    pub store: Arc<dyn AssetStore>,
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
    pub public_prefix: String,
}

/// CORS configuration.
#[derive(Clone)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

/// In-process session map for the OAuth login proxy: session id -> bearer
/// token. The core never inspects the token; it is only forwarded.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token under a fresh session id and return the id.
    pub async fn insert(&self, token: String) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.inner
            .write()
            .await
            .insert(session_id.clone(), token);
        session_id
    }

    pub async fn get(&self, session_id: &str) -> Option<String> {
        self.inner.read().await.get(session_id).cloned()
    }
}

/// OAuth login proxy state: provider configuration, outbound HTTP client,
/// and the session map.
#[derive(Clone)]
pub struct AuthState {
    pub oauth: Option<OAuthConfig>,
    pub http: reqwest::Client,
    pub sessions: SessionStore,
}

impl AuthState {
    /// Provider configuration, or a not-found error when login is disabled.
    pub fn oauth(&self) -> Result<&OAuthConfig, AppError> {
        self.oauth
            .as_ref()
            .ok_or_else(|| AppError::NotFound("OAuth login is not configured".to_string()))
    }
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub media: MediaConfig,
    pub security: SecurityConfig,
    pub auth: AuthState,
    pub config: Config,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for MediaConfig {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.media.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for SecurityConfig {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.security.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for AuthState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.auth.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
