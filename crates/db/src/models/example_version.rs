//! Immutable example versions.

use coursework_core::deployment::validate_version_tag;
use coursework_core::dto::{from_validation_errors, EntityInterface};
use coursework_core::error::CoreError;
use coursework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `example_versions` table. Rows are never updated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExampleVersion {
    pub id: DbId,
    pub example_id: DbId,
    /// Monotonic per example; decides what `latest` means.
    pub version_number: i32,
    pub version_tag: String,
    pub storage_path: Option<String>,
    pub meta: serde_json::Value,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// The example comes from the request path; the number is assigned.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExampleVersion {
    pub version_tag: String,
    #[validate(length(min = 1, max = 1024))]
    pub storage_path: Option<String>,
    pub meta: Option<serde_json::Value>,
}

impl EntityInterface for CreateExampleVersion {
    const ENTITY: &'static str = "example_version";

    fn validate(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)?;
        validate_version_tag(&self.version_tag)?;
        if let Some(meta) = &self.meta {
            if !meta.is_object() {
                return Err(CoreError::Validation("meta: must be an object".into()));
            }
        }
        Ok(())
    }

    fn to_storage(self) -> Result<Self, CoreError> {
        EntityInterface::validate(&self)?;
        Ok(self)
    }
}
