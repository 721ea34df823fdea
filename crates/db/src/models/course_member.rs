//! Course membership model and DTOs.

use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::permissions::CourseRole;
use coursework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `course_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseMember {
    pub id: DbId,
    pub course_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The course comes from the request path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseMember {
    pub user_id: DbId,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCourseMember {
    pub role: String,
}

impl EntityInterface for CreateCourseMember {
    const ENTITY: &'static str = "course_member";

    fn validate(&self) -> Result<(), CoreError> {
        self.role.parse::<CourseRole>()?;
        Ok(())
    }

    fn to_storage(mut self) -> Result<Self, CoreError> {
        self.role = self.role.parse::<CourseRole>()?.as_str().to_string();
        Ok(self)
    }
}

impl UpdateCourseMember {
    pub fn check(&self) -> Result<(), CoreError> {
        self.role.parse::<CourseRole>()?;
        Ok(())
    }
}
