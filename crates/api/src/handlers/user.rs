//! Handlers for `/admin/users`. Every route requires the admin role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::types::DbId;
use coursework_db::models::user::{CreateUser, UpdateUser, User};
use coursework_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// GET /api/v1/admin/users
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ListResponse<User>> {
    let (limit, offset) = page.resolve();
    let users = UserRepo::list(&state.pool, limit, offset).await?;
    let total = UserRepo::count(&state.pool).await?;
    Ok(ListResponse::new(users, total))
}

/// POST /api/v1/admin/users
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    let input = input.to_storage()?;
    let user = UserRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = user.id, created_by = admin.user_id, "User created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<User>>> {
    input.check()?;
    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse { data: user }))
}

/// DELETE /api/v1/admin/users/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest("Cannot delete your own account".into()));
    }
    if UserRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}
