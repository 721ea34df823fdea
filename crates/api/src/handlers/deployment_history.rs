//! Handler for `/courses/{course_id}/deployment-history`.

use axum::extract::{Path, Query, State};
use coursework_core::path::canonicalize;
use coursework_core::permissions::{Action, Resource};
use coursework_core::types::DbId;
use coursework_db::models::deployment_history::DeploymentHistory;
use coursework_db::repositories::DeploymentHistoryRepo;

use super::access::course_for;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{HistoryParams, PaginationParams};
use crate::response::ListResponse;
use crate::state::AppState;

/// GET /api/v1/courses/{course_id}/deployment-history
///
/// Newest first. `path` restricts to one deployment path.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
    Query(params): Query<HistoryParams>,
) -> AppResult<ListResponse<DeploymentHistory>> {
    course_for(&state, &user.principal(), Resource::Deployment, Action::List, course_id).await?;

    let path = params.path.as_deref().map(canonicalize).transpose()?;
    let (limit, offset) = page.resolve();
    let entries =
        DeploymentHistoryRepo::list_for_course(&state.pool, course_id, path.as_deref(), limit, offset)
            .await?;
    let total =
        DeploymentHistoryRepo::count_for_course(&state.pool, course_id, path.as_deref()).await?;
    Ok(ListResponse::new(entries, total))
}
