//! Authorization helpers shared by the handlers.
//!
//! Course-scoped handlers first load the course through the principal's
//! scope. An empty scoped result is then told apart as 403 (the course exists)
//! or 404 (it does not).

use coursework_core::error::CoreError;
use coursework_core::permissions::{
    scope_for, visibility_error, Action, Principal, Resource, Scope,
};
use coursework_core::types::DbId;
use coursework_db::models::course::Course;
use coursework_db::models::course_content::CourseContent;
use coursework_db::repositories::{CourseContentRepo, CourseMemberRepo, CourseRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Load a course the principal may act on for `resource`/`action`.
pub async fn course_for(
    state: &AppState,
    principal: &Principal,
    resource: Resource,
    action: Action,
    course_id: DbId,
) -> AppResult<Course> {
    let scope = scope_for(principal, resource, action);
    if let Some(course) = CourseRepo::find_scoped(&state.pool, principal, scope, course_id).await? {
        return Ok(course);
    }
    let exists = CourseRepo::exists(&state.pool, course_id).await?;
    if exists {
        tracing::debug!(
            user_id = principal.user_id,
            course_id,
            ?resource,
            ?action,
            "Course hidden by scope"
        );
    }
    Err(visibility_error("Course", course_id, exists).into())
}

/// Load a content row that must belong to `course_id`.
pub async fn content_in_course(
    state: &AppState,
    course_id: DbId,
    content_id: DbId,
) -> AppResult<CourseContent> {
    CourseContentRepo::find_in_course(&state.pool, course_id, content_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CourseContent",
            id: content_id,
        }))
}

/// Authoring rights on the example catalog.
///
/// Admins always pass; other users need the role floor in at least one
/// course.
pub async fn require_catalog_write(state: &AppState, principal: &Principal) -> AppResult<()> {
    match scope_for(principal, Resource::Example, Action::Create) {
        Scope::All => Ok(()),
        Scope::Nothing => Err(forbidden()),
        Scope::CourseRole(min) => {
            if CourseMemberRepo::has_role_anywhere(&state.pool, principal.user_id, min).await? {
                Ok(())
            } else {
                Err(forbidden())
            }
        }
    }
}

fn forbidden() -> AppError {
    AppError::Core(CoreError::Forbidden(
        "Not permitted to modify examples".into(),
    ))
}
