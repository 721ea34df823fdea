//! Route definitions for `/validate`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::validation;
use crate::state::AppState;

/// Routes mounted at `/validate`.
///
/// ```text
/// GET    /            -> list_entities
/// POST   /{entity}    -> validate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(validation::list_entities))
        .route("/{entity}", post(validation::validate))
}
