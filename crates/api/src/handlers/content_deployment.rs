//! Handlers for `/courses/{course_id}/contents/{content_id}/deployment`.
//!
//! A content has at most one deployment. Assigning an example version puts it
//! in `pending`; an external task runner picks it up and reports progress on
//! the `status` callback until it is `active` or `failed`.

use axum::extract::{Path, State};
use axum::Json;
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::permissions::{Action, Resource};
use coursework_core::types::DbId;
use coursework_db::models::course_content_deployment::{
    AssignExample, CourseContentDeployment, DeploymentStatusReport,
};
use coursework_db::repositories::{AssignOutcome, ContentRef, CourseContentDeploymentRepo};

use super::access::{content_in_course, course_for};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn no_deployment(content_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CourseContentDeployment",
        id: content_id,
    })
}

/// GET /api/v1/courses/{course_id}/contents/{content_id}/deployment
pub async fn get(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, content_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CourseContentDeployment>>> {
    course_for(&state, &user.principal(), Resource::Deployment, Action::Get, course_id).await?;
    content_in_course(&state, course_id, content_id).await?;
    let deployment = CourseContentDeploymentRepo::find_by_content(&state.pool, content_id)
        .await?
        .ok_or_else(|| no_deployment(content_id))?;
    Ok(Json(DataResponse { data: deployment }))
}

/// PUT /api/v1/courses/{course_id}/contents/{content_id}/deployment
///
/// Assign (or re-assign) an example version. `version_tag` may be omitted or
/// `latest`; the stored tag is always concrete.
pub async fn assign(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, content_id)): Path<(DbId, DbId)>,
    Json(input): Json<AssignExample>,
) -> AppResult<Json<DataResponse<CourseContentDeployment>>> {
    course_for(&state, &user.principal(), Resource::Deployment, Action::Update, course_id)
        .await?;
    let content = content_in_course(&state, course_id, content_id).await?;
    let input = input.to_storage()?;

    let target = ContentRef {
        course_id,
        content_id,
        path: &content.path,
    };
    match CourseContentDeploymentRepo::assign(&state.pool, target, &input, Some(user.user_id))
        .await?
    {
        AssignOutcome::Assigned(deployment) => Ok(Json(DataResponse { data: deployment })),
        AssignOutcome::ExampleNotFound => Err(AppError::Core(CoreError::NotFoundBy {
            entity: "Example",
            key: input.example_identifier,
        })),
        AssignOutcome::VersionNotFound => Err(AppError::Core(CoreError::NotFoundBy {
            entity: "ExampleVersion",
            key: format!(
                "{}@{}",
                input.example_identifier,
                input.version_tag.as_deref().unwrap_or("latest")
            ),
        })),
    }
}

/// DELETE /api/v1/courses/{course_id}/contents/{content_id}/deployment
pub async fn unassign(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, content_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CourseContentDeployment>>> {
    course_for(&state, &user.principal(), Resource::Deployment, Action::Delete, course_id)
        .await?;
    let content = content_in_course(&state, course_id, content_id).await?;
    let target = ContentRef {
        course_id,
        content_id,
        path: &content.path,
    };
    let deployment =
        CourseContentDeploymentRepo::unassign(&state.pool, target, Some(user.user_id))
            .await?
            .ok_or_else(|| no_deployment(content_id))?;
    Ok(Json(DataResponse { data: deployment }))
}

/// POST /api/v1/courses/{course_id}/contents/{content_id}/deployment/status
///
/// Task-runner callback. `status` is a status name or a legacy integer code.
pub async fn report_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, content_id)): Path<(DbId, DbId)>,
    Json(report): Json<DeploymentStatusReport>,
) -> AppResult<Json<DataResponse<CourseContentDeployment>>> {
    course_for(&state, &user.principal(), Resource::Deployment, Action::Update, course_id)
        .await?;
    let content = content_in_course(&state, course_id, content_id).await?;
    let status = report.check()?;

    let target = ContentRef {
        course_id,
        content_id,
        path: &content.path,
    };
    if let Some(deployment) =
        CourseContentDeploymentRepo::update_status(&state.pool, target, status, &report).await?
    {
        return Ok(Json(DataResponse { data: deployment }));
    }

    // Either never assigned or already removed.
    match CourseContentDeploymentRepo::find_by_content(&state.pool, content_id).await? {
        Some(_) => Err(AppError::Core(CoreError::Conflict(format!(
            "Deployment of content {content_id} was removed"
        )))),
        None => Err(no_deployment(content_id)),
    }
}
