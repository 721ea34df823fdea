//! Handlers for `/validate`: dry-run validation of create payloads by entity
//! name, without touching the database.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ValidationResult {
    pub entity: String,
    pub valid: bool,
}

/// GET /api/v1/validate
///
/// Entity names accepted by the dry-run endpoint.
pub async fn list_entities(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Json<DataResponse<Vec<&'static str>>> {
    Json(DataResponse {
        data: state.registry.entities(),
    })
}

/// POST /api/v1/validate/{entity}
///
/// 200 when the payload would be accepted by the create endpoint, 400 with
/// the validation message otherwise, 404 for an unknown entity name.
pub async fn validate(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Json(payload): Json<Value>,
) -> AppResult<Json<DataResponse<ValidationResult>>> {
    state.registry.validate(&entity, &payload)?;
    Ok(Json(DataResponse {
        data: ValidationResult {
            entity,
            valid: true,
        },
    }))
}
