//! Handlers for `/organizations`.
//!
//! Any authenticated user may read organizations; writes need the admin
//! role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::permissions::{require_some, scope_for, Action, Resource};
use coursework_core::types::DbId;
use coursework_db::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use coursework_db::repositories::OrganizationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

fn authorize(user: &AuthUser, action: Action) -> AppResult<()> {
    require_some(
        scope_for(&user.principal(), Resource::Organization, action),
        "manage organizations",
    )?;
    Ok(())
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Organization",
        id,
    })
}

/// GET /api/v1/organizations
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ListResponse<Organization>> {
    authorize(&user, Action::List)?;
    let (limit, offset) = page.resolve();
    let organizations = OrganizationRepo::list(&state.pool, limit, offset).await?;
    let total = OrganizationRepo::count(&state.pool).await?;
    Ok(ListResponse::new(organizations, total))
}

/// POST /api/v1/organizations
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateOrganization>,
) -> AppResult<(StatusCode, Json<DataResponse<Organization>>)> {
    authorize(&user, Action::Create)?;
    let input = input.to_storage()?;
    let organization = OrganizationRepo::create(&state.pool, &input).await?;
    tracing::info!(organization_id = organization.id, path = %organization.path, "Organization created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: organization })))
}

/// GET /api/v1/organizations/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Organization>>> {
    authorize(&user, Action::Get)?;
    let organization = OrganizationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: organization }))
}

/// PUT /api/v1/organizations/{id}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrganization>,
) -> AppResult<Json<DataResponse<Organization>>> {
    authorize(&user, Action::Update)?;
    input.check()?;
    let organization = OrganizationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: organization }))
}

/// DELETE /api/v1/organizations/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&user, Action::Delete)?;
    if OrganizationRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
