//! Shared query parameter types for API handlers.
//!
//! Multiple `Query<..>` extractors may be combined in one handler; each
//! ignores parameters it does not know.

use coursework_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use coursework_core::types::DbId;
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)`.
    pub fn resolve(&self) -> (i64, i64) {
        (
            clamp_limit(self.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
            clamp_offset(self.offset),
        )
    }
}

/// `?organization_id=` filter for course listings.
#[derive(Debug, Deserialize)]
pub struct OrganizationFilterParams {
    pub organization_id: Option<DbId>,
}

/// `?include_archived=` flag for course content listings.
#[derive(Debug, Deserialize)]
pub struct IncludeArchivedParams {
    #[serde(default)]
    pub include_archived: bool,
}

/// Filters for `/courses/{id}/deployments`.
#[derive(Debug, Deserialize)]
pub struct DeploymentListParams {
    pub path: Option<String>,
    /// Also list replaced and removed deployments.
    #[serde(default)]
    pub include_inactive: bool,
}

/// `?path=` filter for deployment history.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub path: Option<String>,
}

/// Filters for `/examples`.
#[derive(Debug, Deserialize)]
pub struct ExampleListParams {
    pub category: Option<String>,
    pub tag: Option<String>,
    /// Identifier prefix; matches the identifier itself and its descendants.
    pub under: Option<String>,
}
