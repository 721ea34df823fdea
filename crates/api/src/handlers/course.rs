//! Handlers for the `/courses` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::permissions::{require_some, scope_for, Action, Resource};
use coursework_core::types::DbId;
use coursework_db::models::course::{Course, CreateCourse, UpdateCourse};
use coursework_db::repositories::CourseRepo;

use super::access::course_for;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{OrganizationFilterParams, PaginationParams};
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// GET /api/v1/courses
///
/// Non-admins only see courses they are a member of.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<OrganizationFilterParams>,
) -> AppResult<ListResponse<Course>> {
    let principal = user.principal();
    let scope = scope_for(&principal, Resource::Course, Action::List);
    let (limit, offset) = page.resolve();

    let courses = CourseRepo::list(
        &state.pool,
        &principal,
        scope,
        filter.organization_id,
        limit,
        offset,
    )
    .await?;
    let total = CourseRepo::count(&state.pool, &principal, scope, filter.organization_id).await?;
    Ok(ListResponse::new(courses, total))
}

/// POST /api/v1/courses
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    require_some(
        scope_for(&user.principal(), Resource::Course, Action::Create),
        "create courses",
    )?;
    let input = input.to_storage()?;
    let course = CourseRepo::create(&state.pool, &input).await?;
    tracing::info!(course_id = course.id, path = %course.path, "Course created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// GET /api/v1/courses/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Course>>> {
    let course = course_for(&state, &user.principal(), Resource::Course, Action::Get, id).await?;
    Ok(Json(DataResponse { data: course }))
}

/// PUT /api/v1/courses/{id}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<Course>>> {
    course_for(&state, &user.principal(), Resource::Course, Action::Update, id).await?;
    input.check()?;
    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/courses/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    course_for(&state, &user.principal(), Resource::Course, Action::Delete, id).await?;
    if CourseRepo::delete(&state.pool, id).await? {
        tracing::info!(course_id = id, "Course deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
    }
}
