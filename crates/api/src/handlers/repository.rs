//! Handler for `/courses/{course_id}/repository/sync`.
//!
//! Brings the local checkout of a course repository to the remote state of
//! its branch. Checkouts live under `<repos_root>/<organization>/<course>`.

use axum::extract::{Path, Query, State};
use axum::Json;
use coursework_core::error::CoreError;
use coursework_core::git::CloneRequest;
use coursework_core::permissions::{Action, Resource};
use coursework_core::types::DbId;
use coursework_db::repositories::OrganizationRepo;
use serde::{Deserialize, Serialize};

use super::access::course_for;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncParams {
    /// Pin the checkout to this commit.
    pub commit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub course_id: DbId,
    /// `cloned` or `updated`.
    pub outcome: &'static str,
    pub branch: String,
    pub commit: Option<String>,
    pub path: String,
}

/// POST /api/v1/courses/{course_id}/repository/sync
pub async fn sync(
    user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Query(params): Query<SyncParams>,
) -> AppResult<Json<DataResponse<SyncResult>>> {
    let course =
        course_for(&state, &user.principal(), Resource::Course, Action::Update, course_id).await?;
    let url = course.repository_url.clone().ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Course {course_id} has no repository_url"
        )))
    })?;
    let organization = OrganizationRepo::find_by_id(&state.pool, course.organization_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id: course.organization_id,
        }))?;

    let git = &state.config.git;
    let request = CloneRequest {
        url,
        user: git.user.clone(),
        token: git.token.clone(),
        branch: course
            .repository_branch
            .clone()
            .unwrap_or_else(|| git.default_branch.clone()),
        commit: params.commit,
        path: git.repos_root.join(&organization.path).join(&course.path),
    };

    let outcome = state.git.clone_or_fetch(&request).await?;
    tracing::info!(
        course_id,
        outcome = outcome.as_str(),
        requested_by = user.user_id,
        "Course repository synchronized"
    );

    Ok(Json(DataResponse {
        data: SyncResult {
            course_id,
            outcome: outcome.as_str(),
            branch: request.branch,
            commit: request.commit,
            path: request.path.to_string_lossy().into_owned(),
        },
    }))
}
