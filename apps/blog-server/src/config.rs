//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use blog_core::{BlogConfig, ListingVisibility};
use blog_core::pagination::DEFAULT_PAGE_SIZE;
use blog_infra::JwtConfig;

/// Connection settings, present only when `DATABASE_URL` is set.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseSettings>,
    pub blog: BlogConfig,
    pub jwt: JwtConfig,
    pub login_url: String,
    pub secure_cookies: bool,
    /// Directory of templates overriding the embedded ones.
    pub template_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseSettings {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(100),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(10),
            run_migrations: flag_var("RUN_MIGRATIONS").unwrap_or(false),
        });

        let listing_visibility = if flag_var("LIST_HIDE_UNPUBLISHED").unwrap_or(false) {
            ListingVisibility::HideUnpublished
        } else {
            ListingVisibility::ShowAll
        };

        let jwt_defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or(jwt_defaults.secret),
            expiration_hours: parse_var("JWT_EXPIRATION_HOURS")
                .unwrap_or(jwt_defaults.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(jwt_defaults.issuer),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            blog: BlogConfig {
                page_size: parse_var("POSTS_PER_PAGE")
                    .filter(|n: &u64| *n > 0)
                    .unwrap_or(DEFAULT_PAGE_SIZE),
                listing_visibility,
            },
            jwt,
            login_url: env::var("LOGIN_URL").unwrap_or_else(|_| "/accounts/login".to_string()),
            secure_cookies: flag_var("SECURE_COOKIES").unwrap_or(false),
            template_dir: env::var("TEMPLATE_DIR").ok().map(PathBuf::from),
        }
    }

    /// Warn about settings that are unsafe outside development.
    pub fn warn_insecure_defaults(&self) {
        if !self.jwt.uses_default_secret() {
            return;
        }

        let is_production = env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false);

        if is_production {
            tracing::error!(
                "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
            );
        } else {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn flag_var(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
