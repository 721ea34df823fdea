//! Route definitions for `/admin`.

use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /users          -> list
/// POST   /users          -> create
/// GET    /users/{id}     -> get_by_id
/// PUT    /users/{id}     -> update
/// DELETE /users/{id}     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(user::list).post(user::create))
        .route(
            "/users/{id}",
            get(user::get_by_id).put(user::update).delete(user::delete),
        )
}
