//! Course entity model and DTOs.

use coursework_core::dto::{from_validation_errors, EntityInterface};
use coursework_core::error::CoreError;
use coursework_core::git::url::{validate_branch, GitUrl};
use coursework_core::path::canonicalize;
use coursework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub organization_id: DbId,
    pub path: String,
    pub title: String,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub repository_branch: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourse {
    pub organization_id: DbId,
    pub path: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub repository_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCourse {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub repository_branch: Option<String>,
}

/// Reject repository settings the git client would refuse later.
fn check_repository(url: Option<&str>, branch: Option<&str>) -> Result<(), CoreError> {
    if let Some(url) = url {
        GitUrl::parse(url)?;
    }
    if let Some(branch) = branch {
        validate_branch(branch)?;
    }
    Ok(())
}

impl EntityInterface for CreateCourse {
    const ENTITY: &'static str = "course";

    fn validate(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)?;
        canonicalize(&self.path)?;
        check_repository(
            self.repository_url.as_deref(),
            self.repository_branch.as_deref(),
        )
    }

    fn to_storage(mut self) -> Result<Self, CoreError> {
        EntityInterface::validate(&self)?;
        self.path = canonicalize(&self.path)?;
        Ok(self)
    }
}

impl UpdateCourse {
    pub fn check(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)?;
        check_repository(
            self.repository_url.as_deref(),
            self.repository_branch.as_deref(),
        )
    }
}
