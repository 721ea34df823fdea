//! Route definitions for the `/examples` catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::{example, example_version};
use crate::state::AppState;

/// Routes mounted at `/examples`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
///
/// GET    /{example_id}/versions             -> list
/// POST   /{example_id}/versions             -> create
/// GET    /{example_id}/versions/{tag}       -> get_by_tag
/// ```
pub fn router() -> Router<AppState> {
    let version_routes = Router::new()
        .route("/", get(example_version::list).post(example_version::create))
        .route("/{tag}", get(example_version::get_by_tag));

    Router::new()
        .route("/", get(example::list).post(example::create))
        .route(
            "/{id}",
            get(example::get_by_id)
                .put(example::update)
                .delete(example::delete),
        )
        .nest("/{example_id}/versions", version_routes)
}
