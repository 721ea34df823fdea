//! Integration tests for permission-filtered reads.

mod common;

use coursework_core::permissions::{scope_for, Action, CourseRole, Principal, Resource, Scope};
use coursework_core::roles::{ROLE_ADMIN, ROLE_USER};
use coursework_db::repositories::{CourseMemberRepo, CourseRepo};
use sqlx::PgPool;

use common::{course, member, user};

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_member_sees_zero_courses(pool: PgPool) {
    course(&pool, "cs101").await;
    course(&pool, "cs102").await;
    let outsider = user(&pool, "outsider").await;

    let principal = Principal::new(outsider.id, ROLE_USER);
    let scope = scope_for(&principal, Resource::Course, Action::List);

    let rows = CourseRepo::list(&pool, &principal, scope, None, 50, 0)
        .await
        .unwrap();
    let total = CourseRepo::count(&pool, &principal, scope, None).await.unwrap();
    assert!(rows.is_empty());
    assert_eq!(total, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_member_sees_only_own_courses(pool: PgPool) {
    let mine = course(&pool, "cs101").await;
    course(&pool, "cs102").await;
    let student = user(&pool, "student").await;
    member(&pool, mine.id, student.id, "student").await;

    let principal = Principal::new(student.id, ROLE_USER);
    let scope = scope_for(&principal, Resource::Course, Action::List);

    let rows = CourseRepo::list(&pool, &principal, scope, None, 50, 0)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, mine.id);
    assert_eq!(CourseRepo::count(&pool, &principal, scope, None).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_sees_everything(pool: PgPool) {
    course(&pool, "cs101").await;
    course(&pool, "cs102").await;

    let principal = Principal::new(0, ROLE_ADMIN);
    let scope = scope_for(&principal, Resource::Course, Action::List);
    assert_eq!(scope, Scope::All);

    let total = CourseRepo::count(&pool, &principal, scope, None).await.unwrap();
    assert_eq!(total, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_role_threshold_is_respected(pool: PgPool) {
    let c = course(&pool, "cs101").await;
    let student = user(&pool, "student").await;
    let tutor = user(&pool, "tutor").await;
    member(&pool, c.id, student.id, "student").await;
    member(&pool, c.id, tutor.id, "tutor").await;

    let scope = Scope::CourseRole(CourseRole::Tutor);

    let as_student = Principal::new(student.id, ROLE_USER);
    let rows = CourseMemberRepo::list(&pool, &as_student, scope, c.id, 50, 0)
        .await
        .unwrap();
    assert!(rows.is_empty(), "students cannot list members");

    let as_tutor = Principal::new(tutor.id, ROLE_USER);
    let rows = CourseMemberRepo::list(&pool, &as_tutor, scope, c.id, 50, 0)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_scoped_fetch_distinguishes_hidden_from_missing(pool: PgPool) {
    let c = course(&pool, "cs101").await;
    let outsider = user(&pool, "outsider").await;
    let principal = Principal::new(outsider.id, ROLE_USER);
    let scope = scope_for(&principal, Resource::Course, Action::Get);

    assert!(CourseRepo::find_scoped(&pool, &principal, scope, c.id)
        .await
        .unwrap()
        .is_none());
    assert!(CourseRepo::exists(&pool, c.id).await.unwrap());
    assert!(!CourseRepo::exists(&pool, c.id + 1000).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lecturer_anywhere_check(pool: PgPool) {
    let c = course(&pool, "cs101").await;
    let lecturer = user(&pool, "lecturer").await;
    let student = user(&pool, "student").await;
    member(&pool, c.id, lecturer.id, "lecturer").await;
    member(&pool, c.id, student.id, "student").await;

    assert!(
        CourseMemberRepo::has_role_anywhere(&pool, lecturer.id, CourseRole::Lecturer)
            .await
            .unwrap()
    );
    assert!(
        !CourseMemberRepo::has_role_anywhere(&pool, student.id, CourseRole::Lecturer)
            .await
            .unwrap()
    );
}
