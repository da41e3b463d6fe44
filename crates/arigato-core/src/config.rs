//! Configuration module
//!
//! This module provides the application configuration, loaded from the
//! environment with per-field defaults. OAuth settings are optional; the
//! login proxy is disabled when no client id is configured.

use std::env;

const MAX_CONNECTIONS: u32 = 1;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_MB: usize = 10;

/// OAuth login proxy configuration (external identity provider).
#[derive(Clone, Debug)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub redirect_uri: String,
    pub scope: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub upload_dir: String,
    pub public_image_prefix: String,
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub frontend_url: String,
    pub oauth: Option<OAuthConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str =
            env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "jpg,jpeg,png,gif,webp".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let oauth = match env::var("OAUTH_CLIENT_ID") {
            Ok(client_id) if !client_id.is_empty() => Some(OAuthConfig {
                client_id,
                client_secret: env::var("OAUTH_CLIENT_SECRET").unwrap_or_default(),
                authorize_url: env::var("OAUTH_AUTHORIZE_URL").unwrap_or_default(),
                token_url: env::var("OAUTH_TOKEN_URL").unwrap_or_default(),
                userinfo_url: env::var("OAUTH_USERINFO_URL").unwrap_or_default(),
                redirect_uri: env::var("OAUTH_REDIRECT_URI")
                    .unwrap_or_else(|_| "http://localhost:5000/callback".to_string()),
                scope: env::var("OAUTH_SCOPE").unwrap_or_else(|_| "openid profile".to_string()),
            }),
            _ => None,
        };

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:thanks_images.db".to_string()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "static/uploads/thanks".to_string()),
            public_image_prefix: env::var("PUBLIC_IMAGE_PREFIX")
                .unwrap_or_else(|_| "/img/thanks".to_string()),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            oauth,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Fail fast on misconfiguration.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_dir.trim().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR must not be empty"));
        }
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }
        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than 0"));
        }
        if let Some(oauth) = &self.oauth {
            if oauth.client_secret.is_empty()
                || oauth.authorize_url.is_empty()
                || oauth.token_url.is_empty()
                || oauth.userinfo_url.is_empty()
            {
                return Err(anyhow::anyhow!(
                    "OAuth is enabled but OAUTH_CLIENT_SECRET, OAUTH_AUTHORIZE_URL, \
                     OAUTH_TOKEN_URL, and OAUTH_USERINFO_URL must all be set"
                ));
            }
        }
        Ok(())
    }
}
