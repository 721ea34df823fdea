//! Handlers for `/courses/{course_id}/deployments`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::path::canonicalize;
use coursework_core::permissions::{scope_for, Action, Resource};
use coursework_core::types::DbId;
use coursework_db::models::example_deployment::{DeployExample, ExampleDeployment};
use coursework_db::repositories::{DeployOutcome, DeploymentFilter, ExampleDeploymentRepo};

use super::access::course_for;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{DeploymentListParams, PaginationParams};
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ExampleDeployment",
        id,
    })
}

/// GET /api/v1/courses/{course_id}/deployments
///
/// Active deployments by default; `include_inactive=true` adds replaced and
/// removed rows. `path` narrows to one deployment path.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
    Query(params): Query<DeploymentListParams>,
) -> AppResult<ListResponse<ExampleDeployment>> {
    let principal = user.principal();
    course_for(&state, &principal, Resource::Deployment, Action::List, course_id).await?;

    let filter = DeploymentFilter {
        path: params.path.as_deref().map(canonicalize).transpose()?,
        include_inactive: params.include_inactive,
    };
    let scope = scope_for(&principal, Resource::Deployment, Action::List);
    let (limit, offset) = page.resolve();
    let deployments = ExampleDeploymentRepo::list(
        &state.pool,
        &principal,
        scope,
        course_id,
        &filter,
        limit,
        offset,
    )
    .await?;
    let total =
        ExampleDeploymentRepo::count(&state.pool, &principal, scope, course_id, &filter).await?;
    Ok(ListResponse::new(deployments, total))
}

/// POST /api/v1/courses/{course_id}/deployments
///
/// Deploy an example version at a path, replacing the active deployment
/// there.
pub async fn deploy(
    user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<DeployExample>,
) -> AppResult<(StatusCode, Json<DataResponse<ExampleDeployment>>)> {
    course_for(&state, &user.principal(), Resource::Deployment, Action::Create, course_id)
        .await?;
    let input = input.to_storage()?;

    match ExampleDeploymentRepo::deploy(&state.pool, course_id, &input, Some(user.user_id))
        .await?
    {
        DeployOutcome::Deployed {
            deployment,
            replaced,
        } => {
            if let Some(previous) = replaced {
                tracing::debug!(
                    course_id,
                    replaced_id = previous.id,
                    replaced_tag = %previous.version_tag,
                    "Previous deployment replaced"
                );
            }
            Ok((StatusCode::CREATED, Json(DataResponse { data: deployment })))
        }
        DeployOutcome::ExampleNotFound => Err(AppError::Core(CoreError::NotFoundBy {
            entity: "Example",
            key: input.example_identifier,
        })),
        DeployOutcome::VersionNotFound => Err(AppError::Core(CoreError::NotFoundBy {
            entity: "ExampleVersion",
            key: format!(
                "{}@{}",
                input.example_identifier,
                input.version_tag.as_deref().unwrap_or("latest")
            ),
        })),
    }
}

/// GET /api/v1/courses/{course_id}/deployments/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ExampleDeployment>>> {
    course_for(&state, &user.principal(), Resource::Deployment, Action::Get, course_id).await?;
    let deployment = ExampleDeploymentRepo::find_in_course(&state.pool, course_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: deployment }))
}

/// DELETE /api/v1/courses/{course_id}/deployments/{id}
///
/// Soft removal: the row stays with status `removed`.
pub async fn remove(
    user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ExampleDeployment>>> {
    course_for(&state, &user.principal(), Resource::Deployment, Action::Delete, course_id)
        .await?;
    if let Some(removed) =
        ExampleDeploymentRepo::remove(&state.pool, course_id, id, Some(user.user_id)).await?
    {
        return Ok(Json(DataResponse { data: removed }));
    }

    match ExampleDeploymentRepo::find_in_course(&state.pool, course_id, id).await? {
        Some(existing) => Err(AppError::Core(CoreError::Conflict(format!(
            "Deployment {id} is already {}",
            existing.status
        )))),
        None => Err(not_found(id)),
    }
}
