pub mod admin;
pub mod course;
pub mod example;
pub mod health;
pub mod organization;
pub mod validation;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Every route requires a bearer token.
///
/// ```text
/// /admin/users                                          list, create (admin only)
/// /admin/users/{id}                                     get, update, delete
///
/// /organizations                                        list, create
/// /organizations/{id}                                   get, update, delete
///
/// /courses                                              list, create
/// /courses/{id}                                         get, update, delete
/// /courses/{course_id}/members[/{id}]                   course members
/// /courses/{course_id}/contents[/{id}]                  course content tree
/// /courses/{course_id}/contents/{id}/deployment         get, assign, unassign
/// /courses/{course_id}/contents/{id}/deployment/status  task-runner callback
/// /courses/{course_id}/deployments[/{id}]               example deployments
/// /courses/{course_id}/deployment-history               audit trail
/// /courses/{course_id}/repository/sync                  clone-or-fetch checkout
///
/// /examples                                             list, create
/// /examples/{id}                                        get, update, delete
/// /examples/{example_id}/versions                       list, create
/// /examples/{example_id}/versions/{tag}                 get (`latest` resolves)
///
/// /validate                                             registered entity names
/// /validate/{entity}                                    dry-run payload validation
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin::router())
        .nest("/organizations", organization::router())
        // Courses and everything nested under a course.
        .nest("/courses", course::router())
        // Example catalog and versions.
        .nest("/examples", example::router())
        .nest("/validate", validation::router())
}
