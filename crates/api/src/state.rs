use std::sync::Arc;

use coursework_core::dto::EntityRegistry;
use coursework_core::git::{CommandRunner, GitClient};

use crate::cache::Cache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: coursework_db::DbPool,
    /// Server configuration, loaded once at startup.
    pub config: Arc<ServerConfig>,
    /// Cache used through [`cache_aside`](crate::cache::cache_aside).
    pub cache: Arc<dyn Cache>,
    /// Create-payload validators keyed by entity name.
    pub registry: Arc<EntityRegistry>,
    /// Git client for course repository checkouts.
    pub git: Arc<GitClient<Arc<dyn CommandRunner>>>,
}
