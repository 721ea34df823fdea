//! Course-level example deployments.

use coursework_core::deployment::{validate_removal_state, DeploymentStatus};
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::path::canonicalize;
use coursework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `example_deployments` table.
///
/// At most one row per `(course_id, deployment_path)` is `active`. Replaced
/// and removed rows are kept as the deployment record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExampleDeployment {
    pub id: DbId,
    pub course_id: DbId,
    pub deployment_path: String,
    pub example_version_id: Option<DbId>,
    pub example_identifier: String,
    /// Always a concrete tag, never `latest`.
    pub version_tag: String,
    pub status: String,
    pub deployed_at: Timestamp,
    pub removed_at: Option<Timestamp>,
    pub deployed_by: Option<DbId>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ExampleDeployment {
    pub fn status(&self) -> Result<DeploymentStatus, CoreError> {
        self.status.parse()
    }

    /// Check the status/`removed_at` pairing of a loaded row.
    pub fn check_consistency(&self) -> Result<(), CoreError> {
        validate_removal_state(self.status()?, self.removed_at)
    }
}

/// Request to deploy an example version at a path in a course.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployExample {
    pub example_identifier: String,
    /// A concrete tag, `latest`, or absent (same as `latest`).
    pub version_tag: Option<String>,
    pub deployment_path: String,
    pub metadata: Option<serde_json::Value>,
}

impl EntityInterface for DeployExample {
    const ENTITY: &'static str = "example_deployment";

    fn validate(&self) -> Result<(), CoreError> {
        canonicalize(&self.example_identifier)?;
        canonicalize(&self.deployment_path)?;
        if let Some(meta) = &self.metadata {
            if !meta.is_object() {
                return Err(CoreError::Validation("metadata: must be an object".into()));
            }
        }
        Ok(())
    }

    fn to_storage(mut self) -> Result<Self, CoreError> {
        EntityInterface::validate(&self)?;
        self.example_identifier = canonicalize(&self.example_identifier)?;
        self.deployment_path = canonicalize(&self.deployment_path)?;
        Ok(self)
    }
}
