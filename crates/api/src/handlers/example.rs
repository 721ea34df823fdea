//! Handlers for the `/examples` catalog.
//!
//! Single-example reads go through the cache; every write invalidates the
//! affected keys after the database change succeeded.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursework_core::deployment::LATEST_ALIAS;
use coursework_core::dto::EntityInterface;
use coursework_core::error::CoreError;
use coursework_core::path::canonicalize;
use coursework_core::types::DbId;
use coursework_db::models::example::{CreateExample, Example, UpdateExample};
use coursework_db::repositories::{ExampleFilter, ExampleRepo, ExampleVersionRepo};

use super::access::require_catalog_write;
use crate::cache::{cache_aside, example_key, example_version_key, invalidate};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{ExampleListParams, PaginationParams};
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Example",
        id,
    })
}

/// Load an example through the cache.
pub(crate) async fn cached_example(state: &AppState, id: DbId) -> AppResult<Example> {
    cache_aside(
        state.cache.as_ref(),
        &example_key(id),
        state.config.cache_ttl,
        || async {
            ExampleRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or_else(|| not_found(id))
        },
    )
    .await
}

/// GET /api/v1/examples
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(params): Query<ExampleListParams>,
) -> AppResult<ListResponse<Example>> {
    let filter = ExampleFilter {
        category: params.category,
        tag: params.tag,
        under: params.under.as_deref().map(canonicalize).transpose()?,
    };
    let (limit, offset) = page.resolve();
    let examples = ExampleRepo::list(&state.pool, &filter, limit, offset).await?;
    let total = ExampleRepo::count(&state.pool, &filter).await?;
    Ok(ListResponse::new(examples, total))
}

/// POST /api/v1/examples
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateExample>,
) -> AppResult<(StatusCode, Json<DataResponse<Example>>)> {
    require_catalog_write(&state, &user.principal()).await?;
    let input = input.to_storage()?;
    let example = ExampleRepo::create(&state.pool, &input, Some(user.user_id)).await?;
    tracing::info!(example_id = example.id, identifier = %example.identifier, "Example created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: example })))
}

/// GET /api/v1/examples/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Example>>> {
    let example = cached_example(&state, id).await?;
    Ok(Json(DataResponse { data: example }))
}

/// PUT /api/v1/examples/{id}
///
/// The identifier is immutable; only descriptive fields change.
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateExample>,
) -> AppResult<Json<DataResponse<Example>>> {
    require_catalog_write(&state, &user.principal()).await?;
    input.check()?;
    let example = ExampleRepo::update(&state.pool, id, &input.normalized())
        .await?
        .ok_or_else(|| not_found(id))?;
    invalidate(state.cache.as_ref(), &[example_key(id)]).await;
    Ok(Json(DataResponse { data: example }))
}

/// DELETE /api/v1/examples/{id}
///
/// Versions go with the example. Deployments keep their identifier and tag
/// snapshots.
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_catalog_write(&state, &user.principal()).await?;
    let tags = ExampleVersionRepo::tags_for_example(&state.pool, id).await?;
    if !ExampleRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    let mut keys: Vec<String> = tags
        .iter()
        .map(|tag| example_version_key(id, tag))
        .collect();
    keys.push(example_version_key(id, LATEST_ALIAS));
    keys.push(example_key(id));
    invalidate(state.cache.as_ref(), &keys).await;

    tracing::info!(example_id = id, deleted_by = user.user_id, "Example deleted");
    Ok(StatusCode::NO_CONTENT)
}
