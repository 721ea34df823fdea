//! User entity model and DTOs.

use coursework_core::dto::{from_validation_errors, EntityInterface};
use coursework_core::error::CoreError;
use coursework_core::roles::SYSTEM_ROLES;
use coursework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub given_name: Option<String>,
    #[validate(length(max = 255))]
    pub family_name: Option<String>,
    /// Defaults to `user` when omitted.
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub given_name: Option<String>,
    #[validate(length(max = 255))]
    pub family_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

pub(crate) fn check_system_role(role: Option<&str>) -> Result<(), CoreError> {
    match role {
        Some(role) if !SYSTEM_ROLES.contains(&role) => Err(CoreError::Validation(format!(
            "role: must be one of {}",
            SYSTEM_ROLES.join(", ")
        ))),
        _ => Ok(()),
    }
}

impl EntityInterface for CreateUser {
    const ENTITY: &'static str = "user";

    fn validate(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)?;
        check_system_role(self.role.as_deref())
    }

    fn to_storage(mut self) -> Result<Self, CoreError> {
        EntityInterface::validate(&self)?;
        self.username = self.username.trim().to_string();
        Ok(self)
    }
}

impl UpdateUser {
    pub fn check(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)?;
        check_system_role(self.role.as_deref())
    }
}
