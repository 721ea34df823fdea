//! Courses, members and contents through the HTTP API, with permission
//! scoping.

mod common;

use axum::http::StatusCode;
use common::{
    add_member, body_json, create, delete, get, post_json, put_json, total_count, user_with_token,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Course CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_creates_and_reads_course(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);

    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();

    let response = get(app, &format!("/api/v1/courses/{id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["path"], "cs101");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_course_path_is_canonicalized(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);

    let course = common::course(app, &admin, "intro/rust").await;
    assert_eq!(course["path"], "intro.rust");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_repository_url_is_400(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);
    let org = create(
        app.clone(),
        "/api/v1/organizations",
        &admin,
        json!({ "path": "org", "title": "Org" }),
    )
    .await;

    let response = post_json(
        app,
        "/api/v1/courses",
        &admin,
        json!({
            "organization_id": org["id"],
            "path": "cs101",
            "title": "Course",
            "repository_url": "not a url",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_course_path_is_409(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);
    let course = common::course(app.clone(), &admin, "cs101").await;

    let response = post_json(
        app,
        "/api/v1/courses",
        &admin,
        json!({
            "organization_id": course["organization_id"],
            "path": "cs101",
            "title": "Again",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_admin_cannot_create_course(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (_, alice) = user_with_token(&pool, "alice", "user").await;
    let app = common::build_test_app(pool);
    let course = common::course(app.clone(), &admin, "cs101").await;

    let response = post_json(
        app,
        "/api/v1/courses",
        &alice,
        json!({
            "organization_id": course["organization_id"],
            "path": "cs102",
            "title": "Mine",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Scoped visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_member_sees_no_courses(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (_, alice) = user_with_token(&pool, "alice", "user").await;
    let app = common::build_test_app(pool);
    common::course(app.clone(), &admin, "cs101").await;

    let response = get(app, "/api/v1/courses", &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(total_count(&response), 0);
    let json = body_json(response).await;
    assert_eq!(json["data"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hidden_course_is_403_missing_course_is_404(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (_, alice) = user_with_token(&pool, "alice", "user").await;
    let app = common::build_test_app(pool);
    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();

    let hidden = get(app.clone(), &format!("/api/v1/courses/{id}"), &alice).await;
    assert_eq!(hidden.status(), StatusCode::FORBIDDEN);

    let missing = get(app, "/api/v1/courses/999999", &alice).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_reads_course_but_cannot_update_it(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (alice_id, alice) = user_with_token(&pool, "alice", "user").await;
    let app = common::build_test_app(pool.clone());
    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();
    add_member(&pool, id, alice_id, "student").await;

    let listed = get(app.clone(), "/api/v1/courses", &alice).await;
    assert_eq!(total_count(&listed), 1);

    let read = get(app.clone(), &format!("/api/v1/courses/{id}"), &alice).await;
    assert_eq!(read.status(), StatusCode::OK);

    let update = put_json(
        app,
        &format!("/api/v1/courses/{id}"),
        &alice,
        json!({ "title": "Renamed" }),
    )
    .await;
    assert_eq!(update.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_maintainer_updates_course(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (bob_id, bob) = user_with_token(&pool, "bob", "user").await;
    let app = common::build_test_app(pool.clone());
    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();
    add_member(&pool, id, bob_id, "maintainer").await;

    let response = put_json(
        app,
        &format!("/api/v1/courses/{id}"),
        &bob,
        json!({ "title": "Renamed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Renamed");
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_member_listing_needs_tutor(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (alice_id, alice) = user_with_token(&pool, "alice", "user").await;
    let (tina_id, tina) = user_with_token(&pool, "tina", "user").await;
    let app = common::build_test_app(pool.clone());
    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();
    add_member(&pool, id, alice_id, "student").await;
    add_member(&pool, id, tina_id, "tutor").await;

    let as_student = get(app.clone(), &format!("/api/v1/courses/{id}/members"), &alice).await;
    assert_eq!(as_student.status(), StatusCode::FORBIDDEN);

    let as_tutor = get(app, &format!("/api/v1/courses/{id}/members"), &tina).await;
    assert_eq!(as_tutor.status(), StatusCode::OK);
    assert_eq!(total_count(&as_tutor), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_member_role_is_400(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (alice_id, _) = user_with_token(&pool, "alice", "user").await;
    let app = common::build_test_app(pool);
    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();

    let response = post_json(
        app,
        &format!("/api/v1/courses/{id}/members"),
        &admin,
        json!({ "user_id": alice_id, "role": "overlord" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_maintainer_adds_lecturer_but_not_owner(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (bob_id, bob) = user_with_token(&pool, "bob", "user").await;
    let (carol_id, _) = user_with_token(&pool, "carol", "user").await;
    let (dave_id, _) = user_with_token(&pool, "dave", "user").await;
    let app = common::build_test_app(pool.clone());
    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();
    add_member(&pool, id, bob_id, "maintainer").await;

    let lecturer = post_json(
        app.clone(),
        &format!("/api/v1/courses/{id}/members"),
        &bob,
        json!({ "user_id": carol_id, "role": "lecturer" }),
    )
    .await;
    assert_eq!(lecturer.status(), StatusCode::CREATED);

    let owner = post_json(
        app,
        &format!("/api/v1/courses/{id}/members"),
        &bob,
        json!({ "user_id": dave_id, "role": "owner" }),
    )
    .await;
    assert_eq!(owner.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_maintainer_cannot_promote_self_to_owner(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (bob_id, bob) = user_with_token(&pool, "bob", "user").await;
    let app = common::build_test_app(pool.clone());
    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();
    let member_id = add_member(&pool, id, bob_id, "maintainer").await;

    let response = put_json(
        app.clone(),
        &format!("/api/v1/courses/{id}/members/{member_id}"),
        &bob,
        json!({ "role": "owner" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let after = get(app, &format!("/api/v1/courses/{id}/members/{member_id}"), &bob).await;
    assert_eq!(body_json(after).await["data"]["role"], "maintainer");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_maintainer_cannot_demote_or_remove_owner(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (olga_id, _) = user_with_token(&pool, "olga", "user").await;
    let (bob_id, bob) = user_with_token(&pool, "bob", "user").await;
    let app = common::build_test_app(pool.clone());
    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();
    let owner_id = add_member(&pool, id, olga_id, "owner").await;
    add_member(&pool, id, bob_id, "maintainer").await;

    let demote = put_json(
        app.clone(),
        &format!("/api/v1/courses/{id}/members/{owner_id}"),
        &bob,
        json!({ "role": "student" }),
    )
    .await;
    assert_eq!(demote.status(), StatusCode::FORBIDDEN);

    let remove = delete(app.clone(), &format!("/api/v1/courses/{id}/members/{owner_id}"), &bob).await;
    assert_eq!(remove.status(), StatusCode::FORBIDDEN);

    // Admins are not capped.
    let as_admin = delete(app, &format!("/api/v1/courses/{id}/members/{owner_id}"), &admin).await;
    assert_eq!(as_admin.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Contents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_content_authoring_needs_lecturer(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (alice_id, alice) = user_with_token(&pool, "alice", "user").await;
    let (lena_id, lena) = user_with_token(&pool, "lena", "user").await;
    let app = common::build_test_app(pool.clone());
    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();
    add_member(&pool, id, alice_id, "student").await;
    add_member(&pool, id, lena_id, "lecturer").await;
    let uri = format!("/api/v1/courses/{id}/contents");
    let body = json!({ "path": "week1/hello", "title": "Hello" });

    let as_student = post_json(app.clone(), &uri, &alice, body.clone()).await;
    assert_eq!(as_student.status(), StatusCode::FORBIDDEN);

    let content = create(app.clone(), &uri, &lena, body).await;
    assert_eq!(content["path"], "week1.hello");
    assert_eq!(content["kind"], "assignment");

    let listed = get(app, &uri, &alice).await;
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(total_count(&listed), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_archived_content_is_hidden_by_default(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);
    let course = common::course(app.clone(), &admin, "cs101").await;
    let id = course["id"].as_i64().unwrap();
    let uri = format!("/api/v1/courses/{id}/contents");
    let content = create(app.clone(), &uri, &admin, json!({ "path": "a", "title": "A" })).await;
    create(app.clone(), &uri, &admin, json!({ "path": "b", "title": "B" })).await;

    let archived = put_json(
        app.clone(),
        &format!("{uri}/{}", content["id"]),
        &admin,
        json!({ "archived": true }),
    )
    .await;
    assert_eq!(archived.status(), StatusCode::OK);
    assert!(body_json(archived).await["data"]["archived_at"].is_string());

    let visible = get(app.clone(), &uri, &admin).await;
    assert_eq!(total_count(&visible), 1);

    let all = get(app, &format!("{uri}?include_archived=true"), &admin).await;
    assert_eq!(total_count(&all), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_content_of_other_course_is_404(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);
    let first = common::course(app.clone(), &admin, "cs101").await;
    let second = common::course(app.clone(), &admin, "cs102").await;
    let content = create(
        app.clone(),
        &format!("/api/v1/courses/{}/contents", first["id"]),
        &admin,
        json!({ "path": "a", "title": "A" }),
    )
    .await;

    let response = get(
        app.clone(),
        &format!("/api/v1/courses/{}/contents/{}", second["id"], content["id"]),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(
        app,
        &format!("/api/v1/courses/{}/contents/{}", first["id"], content["id"]),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
