//! Handlers for `/courses/{course_id}/members`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::permissions::{
    ensure_role_within, scope_for, Action, CourseRole, Principal, Resource,
};
use coursework_core::types::DbId;
use coursework_db::models::course_member::{
    CourseMember, CreateCourseMember, UpdateCourseMember,
};
use coursework_db::repositories::CourseMemberRepo;

use super::access::course_for;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CourseMember",
        id,
    })
}

/// The caller's own role in the course, which caps the roles they may
/// manage. `None` for admins.
async fn role_cap(
    state: &AppState,
    principal: &Principal,
    course_id: DbId,
) -> AppResult<Option<CourseRole>> {
    if principal.is_admin() {
        return Ok(None);
    }
    let role = CourseMemberRepo::role_of(&state.pool, course_id, principal.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden("Not a member of this course".into()))
        })?;
    Ok(Some(role.parse::<CourseRole>()?))
}

/// GET /api/v1/courses/{course_id}/members
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ListResponse<CourseMember>> {
    let principal = user.principal();
    course_for(&state, &principal, Resource::CourseMember, Action::List, course_id).await?;

    let scope = scope_for(&principal, Resource::CourseMember, Action::List);
    let (limit, offset) = page.resolve();
    let members =
        CourseMemberRepo::list(&state.pool, &principal, scope, course_id, limit, offset).await?;
    let total = CourseMemberRepo::count(&state.pool, &principal, scope, course_id).await?;
    Ok(ListResponse::new(members, total))
}

/// POST /api/v1/courses/{course_id}/members
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreateCourseMember>,
) -> AppResult<(StatusCode, Json<DataResponse<CourseMember>>)> {
    let principal = user.principal();
    course_for(&state, &principal, Resource::CourseMember, Action::Create, course_id).await?;
    let input = input.to_storage()?;
    let cap = role_cap(&state, &principal, course_id).await?;
    ensure_role_within(cap, input.role.parse::<CourseRole>()?)?;
    let member = CourseMemberRepo::create(&state.pool, course_id, &input).await?;
    tracing::info!(
        course_id,
        user_id = member.user_id,
        role = %member.role,
        "Course member added"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// GET /api/v1/courses/{course_id}/members/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CourseMember>>> {
    course_for(&state, &user.principal(), Resource::CourseMember, Action::Get, course_id).await?;
    let member = CourseMemberRepo::find_in_course(&state.pool, course_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: member }))
}

/// PUT /api/v1/courses/{course_id}/members/{id}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCourseMember>,
) -> AppResult<Json<DataResponse<CourseMember>>> {
    let principal = user.principal();
    course_for(&state, &principal, Resource::CourseMember, Action::Update, course_id).await?;
    input.check()?;
    let cap = role_cap(&state, &principal, course_id).await?;
    if cap.is_some() {
        let current = CourseMemberRepo::find_in_course(&state.pool, course_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        ensure_role_within(cap, current.role.parse::<CourseRole>()?)?;
        ensure_role_within(cap, input.role.parse::<CourseRole>()?)?;
    }
    let member = CourseMemberRepo::update(&state.pool, course_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: member }))
}

/// DELETE /api/v1/courses/{course_id}/members/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let principal = user.principal();
    course_for(&state, &principal, Resource::CourseMember, Action::Delete, course_id).await?;
    let cap = role_cap(&state, &principal, course_id).await?;
    if cap.is_some() {
        let current = CourseMemberRepo::find_in_course(&state.pool, course_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        ensure_role_within(cap, current.role.parse::<CourseRole>()?)?;
    }
    if CourseMemberRepo::delete(&state.pool, course_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
