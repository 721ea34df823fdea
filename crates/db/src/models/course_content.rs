//! Course content tree model and DTOs.

use coursework_core::dto::{from_validation_errors, EntityInterface};
use coursework_core::error::CoreError;
use coursework_core::path::canonicalize;
use coursework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const CONTENT_KINDS: &[&str] = &["assignment", "unit"];

/// A row from the `course_contents` table.
///
/// `path` places the content in the course tree (`week1.intro` is a child of
/// `week1`); `position` orders siblings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseContent {
    pub id: DbId,
    pub course_id: DbId,
    pub path: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub position: f64,
    pub max_submissions: Option<i32>,
    pub archived_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseContent {
    pub path: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `assignment`.
    pub kind: Option<String>,
    pub position: Option<f64>,
    #[validate(range(min = 1))]
    pub max_submissions: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCourseContent {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<f64>,
    #[validate(range(min = 1))]
    pub max_submissions: Option<i32>,
    /// `true` archives, `false` restores.
    pub archived: Option<bool>,
}

fn check_kind(kind: Option<&str>) -> Result<(), CoreError> {
    match kind {
        Some(kind) if !CONTENT_KINDS.contains(&kind) => Err(CoreError::Validation(format!(
            "kind: must be one of {}",
            CONTENT_KINDS.join(", ")
        ))),
        _ => Ok(()),
    }
}

impl EntityInterface for CreateCourseContent {
    const ENTITY: &'static str = "course_content";

    fn validate(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)?;
        canonicalize(&self.path)?;
        check_kind(self.kind.as_deref())
    }

    fn to_storage(mut self) -> Result<Self, CoreError> {
        EntityInterface::validate(&self)?;
        self.path = canonicalize(&self.path)?;
        Ok(self)
    }
}

impl UpdateCourseContent {
    pub fn check(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)
    }
}
