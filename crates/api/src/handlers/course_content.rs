//! Handlers for `/courses/{course_id}/contents`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::permissions::{scope_for, Action, Resource};
use coursework_core::types::DbId;
use coursework_db::models::course_content::{
    CourseContent, CreateCourseContent, UpdateCourseContent,
};
use coursework_db::repositories::CourseContentRepo;

use super::access::{content_in_course, course_for};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{IncludeArchivedParams, PaginationParams};
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// GET /api/v1/courses/{course_id}/contents
///
/// Archived contents are hidden unless `include_archived=true`.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
    Query(params): Query<IncludeArchivedParams>,
) -> AppResult<ListResponse<CourseContent>> {
    let principal = user.principal();
    course_for(&state, &principal, Resource::CourseContent, Action::List, course_id).await?;

    let scope = scope_for(&principal, Resource::CourseContent, Action::List);
    let (limit, offset) = page.resolve();
    let contents = CourseContentRepo::list(
        &state.pool,
        &principal,
        scope,
        course_id,
        params.include_archived,
        limit,
        offset,
    )
    .await?;
    let total = CourseContentRepo::count(
        &state.pool,
        &principal,
        scope,
        course_id,
        params.include_archived,
    )
    .await?;
    Ok(ListResponse::new(contents, total))
}

/// POST /api/v1/courses/{course_id}/contents
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreateCourseContent>,
) -> AppResult<(StatusCode, Json<DataResponse<CourseContent>>)> {
    course_for(&state, &user.principal(), Resource::CourseContent, Action::Create, course_id)
        .await?;
    let input = input.to_storage()?;
    let content = CourseContentRepo::create(&state.pool, course_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: content })))
}

/// GET /api/v1/courses/{course_id}/contents/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CourseContent>>> {
    course_for(&state, &user.principal(), Resource::CourseContent, Action::Get, course_id)
        .await?;
    let content = content_in_course(&state, course_id, id).await?;
    Ok(Json(DataResponse { data: content }))
}

/// PUT /api/v1/courses/{course_id}/contents/{id}
///
/// `archived: true` archives the content, `archived: false` restores it.
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCourseContent>,
) -> AppResult<Json<DataResponse<CourseContent>>> {
    course_for(&state, &user.principal(), Resource::CourseContent, Action::Update, course_id)
        .await?;
    input.check()?;
    let content = CourseContentRepo::update(&state.pool, course_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CourseContent",
            id,
        }))?;
    Ok(Json(DataResponse { data: content }))
}

/// DELETE /api/v1/courses/{course_id}/contents/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    course_for(&state, &user.principal(), Resource::CourseContent, Action::Delete, course_id)
        .await?;
    if CourseContentRepo::delete(&state.pool, course_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "CourseContent",
            id,
        }))
    }
}
