//! Per-content deployment assignments driven by external task runners.

use coursework_core::deployment::DeploymentStatus;
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::path::canonicalize;
use coursework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `course_content_deployments` table, one per content.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseContentDeployment {
    pub id: DbId,
    pub course_content_id: DbId,
    pub example_version_id: Option<DbId>,
    pub example_identifier: String,
    pub version_tag: String,
    pub deployment_status: String,
    /// Correlation id of the task-runner job handling the deployment.
    pub workflow_id: Option<String>,
    pub deployment_message: Option<String>,
    pub deployment_metadata: serde_json::Value,
    pub assigned_at: Timestamp,
    pub deployed_at: Option<Timestamp>,
    pub last_attempt_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Assign an example version to a course content.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignExample {
    pub example_identifier: String,
    pub version_tag: Option<String>,
}

impl EntityInterface for AssignExample {
    const ENTITY: &'static str = "course_content_deployment";

    fn validate(&self) -> Result<(), CoreError> {
        canonicalize(&self.example_identifier)?;
        Ok(())
    }

    fn to_storage(mut self) -> Result<Self, CoreError> {
        self.example_identifier = canonicalize(&self.example_identifier)?;
        Ok(self)
    }
}

/// Reported status in a task-runner callback: the status name, or an integer
/// code from older runners.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReportedStatus {
    Name(String),
    Legacy(i16),
}

impl ReportedStatus {
    /// Resolve to a status a runner is allowed to report.
    pub fn resolve(&self) -> Result<DeploymentStatus, CoreError> {
        let status = match self {
            Self::Name(name) => name.parse::<DeploymentStatus>()?,
            Self::Legacy(code) => DeploymentStatus::from_legacy_code(*code).ok_or_else(|| {
                CoreError::Validation(format!("Unknown legacy status code {code}"))
            })?,
        };
        if !status.is_runner_reportable() {
            return Err(CoreError::Validation(format!(
                "Status '{status}' cannot be reported by a task runner"
            )));
        }
        Ok(status)
    }
}

/// Body of the task-runner status callback.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentStatusReport {
    pub status: ReportedStatus,
    pub workflow_id: Option<String>,
    pub message: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl DeploymentStatusReport {
    /// Resolve the reported status and check the metadata shape.
    pub fn check(&self) -> Result<DeploymentStatus, CoreError> {
        if let Some(meta) = &self.metadata {
            if !meta.is_object() {
                return Err(CoreError::Validation("metadata: must be an object".into()));
            }
        }
        self.status.resolve()
    }
}
