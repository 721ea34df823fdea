//! Organization entity model and DTOs.

use coursework_core::dto::{from_validation_errors, EntityInterface};
use coursework_core::error::CoreError;
use coursework_core::path::canonicalize;
use coursework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub path: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrganization {
    pub path: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
}

/// The path is immutable once created.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOrganization {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
}

impl EntityInterface for CreateOrganization {
    const ENTITY: &'static str = "organization";

    fn validate(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)?;
        canonicalize(&self.path)?;
        Ok(())
    }

    fn to_storage(mut self) -> Result<Self, CoreError> {
        EntityInterface::validate(&self)?;
        self.path = canonicalize(&self.path)?;
        Ok(self)
    }
}

impl UpdateOrganization {
    pub fn check(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)
    }
}
