//! Append-only deployment history.

use coursework_core::deployment::HistoryAction;
use coursework_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `deployment_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeploymentHistory {
    pub id: DbId,
    pub course_id: DbId,
    pub example_deployment_id: Option<DbId>,
    pub course_content_deployment_id: Option<DbId>,
    pub action: String,
    pub deployment_path: Option<String>,
    pub example_version_id: Option<DbId>,
    pub example_identifier: String,
    pub version_tag: String,
    pub previous_version_tag: Option<String>,
    pub metadata: serde_json::Value,
    pub workflow_id: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// Internal insert DTO; history is never written from a request body.
#[derive(Debug, Clone)]
pub struct NewDeploymentHistory {
    pub course_id: DbId,
    pub example_deployment_id: Option<DbId>,
    pub course_content_deployment_id: Option<DbId>,
    pub action: HistoryAction,
    pub deployment_path: Option<String>,
    pub example_version_id: Option<DbId>,
    pub example_identifier: String,
    pub version_tag: String,
    pub previous_version_tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub workflow_id: Option<String>,
    pub created_by: Option<DbId>,
}
