use std::path::PathBuf;
use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Built once at startup and shared through [`AppState`](crate::state::AppState).
/// All fields except the JWT secret and database URL have development
/// defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Source-control settings for course repositories.
    pub git: GitConfig,
    /// Lifetime of cache-aside entries (default: `60` seconds).
    pub cache_ttl: Duration,
}

/// Where course repositories are checked out and which credentials the clone
/// URLs carry.
#[derive(Debug, Clone)]
pub struct GitConfig {
    /// Checkout root; each course lands in `<root>/<organization>/<course>`.
    pub repos_root: PathBuf,
    pub user: Option<String>,
    pub token: Option<String>,
    /// Branch used when a course does not name one (default: `main`).
    pub default_branch: String,
}

impl GitConfig {
    /// | Env Var              | Default          |
    /// |----------------------|------------------|
    /// | `GIT_REPOS_ROOT`     | `./repositories` |
    /// | `GIT_USER`           | unset            |
    /// | `GIT_TOKEN`          | unset            |
    /// | `GIT_DEFAULT_BRANCH` | `main`           |
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        Self {
            repos_root: PathBuf::from(
                std::env::var("GIT_REPOS_ROOT").unwrap_or_else(|_| "./repositories".into()),
            ),
            user: non_empty("GIT_USER"),
            token: non_empty("GIT_TOKEN"),
            default_branch: std::env::var("GIT_DEFAULT_BRANCH").unwrap_or_else(|_| "main".into()),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `CACHE_TTL_SECS`       | `60`                       |
    ///
    /// See [`JwtConfig::from_env`] and [`GitConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cache_ttl_secs: u64 = std::env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("CACHE_TTL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            git: GitConfig::from_env(),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        }
    }
}
