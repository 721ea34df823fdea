//! Handlers for `/examples/{example_id}/versions`.
//!
//! Versions are append-only. Reads by tag accept `latest`, which resolves to
//! the highest version number.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursework_core::deployment::{VersionSelector, LATEST_ALIAS};
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::types::DbId;
use coursework_db::models::example_version::{CreateExampleVersion, ExampleVersion};
use coursework_db::repositories::ExampleVersionRepo;

use super::access::require_catalog_write;
use super::example::cached_example;
use crate::cache::{cache_aside, example_version_key, invalidate};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// GET /api/v1/examples/{example_id}/versions
///
/// Newest first.
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(example_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ListResponse<ExampleVersion>> {
    cached_example(&state, example_id).await?;
    let (limit, offset) = page.resolve();
    let versions =
        ExampleVersionRepo::list_for_example(&state.pool, example_id, limit, offset).await?;
    let total = ExampleVersionRepo::count_for_example(&state.pool, example_id).await?;
    Ok(ListResponse::new(versions, total))
}

/// POST /api/v1/examples/{example_id}/versions
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Path(example_id): Path<DbId>,
    Json(input): Json<CreateExampleVersion>,
) -> AppResult<(StatusCode, Json<DataResponse<ExampleVersion>>)> {
    require_catalog_write(&state, &user.principal()).await?;
    let input = input.to_storage()?;
    let version = ExampleVersionRepo::create(&state.pool, example_id, &input, Some(user.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Example",
            id: example_id,
        }))?;
    invalidate(
        state.cache.as_ref(),
        &[example_version_key(example_id, LATEST_ALIAS)],
    )
    .await;
    tracing::info!(
        example_id,
        version_number = version.version_number,
        version_tag = %version.version_tag,
        "Example version created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}

/// GET /api/v1/examples/{example_id}/versions/{tag}
pub async fn get_by_tag(
    _user: AuthUser,
    State(state): State<AppState>,
    Path((example_id, tag)): Path<(DbId, String)>,
) -> AppResult<Json<DataResponse<ExampleVersion>>> {
    let selector = VersionSelector::parse(Some(&tag));
    let key = example_version_key(example_id, selector.describe());
    let version = cache_aside(
        state.cache.as_ref(),
        &key,
        state.config.cache_ttl,
        || async {
            ExampleVersionRepo::resolve(&state.pool, example_id, &selector)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::NotFoundBy {
                        entity: "ExampleVersion",
                        key: format!("{example_id}@{}", selector.describe()),
                    })
                })
        },
    )
    .await?;
    Ok(Json(DataResponse { data: version }))
}
