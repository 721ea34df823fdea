//! Route definitions for the `/courses` resource.
//!
//! Members, contents, deployments, history and the repository checkout are
//! nested under `/courses/{course_id}/...`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{
    content_deployment, course, course_content, course_member, deployment, deployment_history,
    repository,
};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                                                 -> list
/// POST   /                                                 -> create
/// GET    /{id}                                             -> get_by_id
/// PUT    /{id}                                             -> update
/// DELETE /{id}                                             -> delete
///
/// GET    /{course_id}/members                              -> list
/// POST   /{course_id}/members                              -> create
/// GET    /{course_id}/members/{id}                         -> get_by_id
/// PUT    /{course_id}/members/{id}                         -> update
/// DELETE /{course_id}/members/{id}                         -> delete
///
/// GET    /{course_id}/contents                             -> list
/// POST   /{course_id}/contents                             -> create
/// GET    /{course_id}/contents/{id}                        -> get_by_id
/// PUT    /{course_id}/contents/{id}                        -> update
/// DELETE /{course_id}/contents/{id}                        -> delete
/// GET    /{course_id}/contents/{id}/deployment             -> get
/// PUT    /{course_id}/contents/{id}/deployment             -> assign
/// DELETE /{course_id}/contents/{id}/deployment             -> unassign
/// POST   /{course_id}/contents/{id}/deployment/status      -> report_status
///
/// GET    /{course_id}/deployments                          -> list
/// POST   /{course_id}/deployments                          -> deploy
/// GET    /{course_id}/deployments/{id}                     -> get_by_id
/// DELETE /{course_id}/deployments/{id}                     -> remove
///
/// GET    /{course_id}/deployment-history                   -> list
///
/// POST   /{course_id}/repository/sync                      -> sync
/// ```
pub fn router() -> Router<AppState> {
    let member_routes = Router::new()
        .route("/", get(course_member::list).post(course_member::create))
        .route(
            "/{id}",
            get(course_member::get_by_id)
                .put(course_member::update)
                .delete(course_member::delete),
        );

    let content_routes = Router::new()
        .route("/", get(course_content::list).post(course_content::create))
        .route(
            "/{id}",
            get(course_content::get_by_id)
                .put(course_content::update)
                .delete(course_content::delete),
        )
        .route(
            "/{id}/deployment",
            get(content_deployment::get)
                .put(content_deployment::assign)
                .delete(content_deployment::unassign),
        )
        .route(
            "/{id}/deployment/status",
            post(content_deployment::report_status),
        );

    let deployment_routes = Router::new()
        .route("/", get(deployment::list).post(deployment::deploy))
        .route(
            "/{id}",
            get(deployment::get_by_id).delete(deployment::remove),
        );

    Router::new()
        .route("/", get(course::list).post(course::create))
        .route(
            "/{id}",
            get(course::get_by_id)
                .put(course::update)
                .delete(course::delete),
        )
        .nest("/{course_id}/members", member_routes)
        .nest("/{course_id}/contents", content_routes)
        .nest("/{course_id}/deployments", deployment_routes)
        .route(
            "/{course_id}/deployment-history",
            get(deployment_history::list),
        )
        .route("/{course_id}/repository/sync", post(repository::sync))
}
