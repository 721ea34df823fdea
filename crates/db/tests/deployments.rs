//! Integration tests for version resolution and the deploy/replace flow.

mod common;

use assert_matches::assert_matches;
use coursework_core::deployment::{DeploymentStatus, VersionSelector};
use coursework_db::repositories::{
    DeployOutcome, DeploymentHistoryRepo, ExampleDeploymentRepo, ExampleVersionRepo,
};
use sqlx::PgPool;

use common::{course, deploy_request, example_with_versions, version};

fn deployed(outcome: DeployOutcome) -> coursework_db::models::example_deployment::ExampleDeployment {
    match outcome {
        DeployOutcome::Deployed { deployment, .. } => deployment,
        other => panic!("expected a deployment, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Version resolution
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_version_numbers_are_sequential_per_example(pool: PgPool) {
    let example = example_with_versions(&pool, "hello", &["v1", "v2", "v3"]).await;

    let versions = ExampleVersionRepo::list_for_example(&pool, example.id, 50, 0)
        .await
        .unwrap();
    let numbers: Vec<i32> = versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![3, 2, 1]);
    assert_eq!(
        ExampleVersionRepo::count_for_example(&pool, example.id).await.unwrap(),
        3
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_latest_resolves_to_highest_version_number(pool: PgPool) {
    let example = example_with_versions(&pool, "hello", &["v1", "v2", "v3"]).await;

    let latest = ExampleVersionRepo::resolve(&pool, example.id, &VersionSelector::Latest)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.version_number, 3);
    assert_eq!(latest.version_tag, "v3");

    let tagged = ExampleVersionRepo::resolve(&pool, example.id, &VersionSelector::parse(Some("v2")))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tagged.version_number, 2);

    let missing = ExampleVersionRepo::resolve(&pool, example.id, &VersionSelector::parse(Some("v9")))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_tag_violates_unique_constraint(pool: PgPool) {
    let example = example_with_versions(&pool, "hello", &["v1"]).await;

    let err = ExampleVersionRepo::create(&pool, example.id, &version("v1"), None)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_example_versions_example_tag"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_version_for_missing_example_is_none(pool: PgPool) {
    let created = ExampleVersionRepo::create(&pool, 9999, &version("v1"), None)
        .await
        .unwrap();
    assert!(created.is_none());
}

// ---------------------------------------------------------------------------
// Deploy / replace
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deploy_latest_stores_concrete_tag(pool: PgPool) {
    let course = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1", "v2"]).await;

    let deployment = deployed(
        ExampleDeploymentRepo::deploy(&pool, course.id, &deploy_request("hello", None, "week1.hello"), None)
            .await
            .unwrap(),
    );

    assert_eq!(deployment.version_tag, "v2");
    assert_eq!(deployment.status().unwrap(), DeploymentStatus::Active);
    assert!(deployment.removed_at.is_none());
    deployment.check_consistency().unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_redeploy_replaces_previous_active_row(pool: PgPool) {
    let course = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1", "v2"]).await;

    let first = deployed(
        ExampleDeploymentRepo::deploy(&pool, course.id, &deploy_request("hello", Some("v1"), "week1"), None)
            .await
            .unwrap(),
    );

    let outcome = ExampleDeploymentRepo::deploy(
        &pool,
        course.id,
        &deploy_request("hello", Some("v2"), "week1"),
        None,
    )
    .await
    .unwrap();
    let (second, replaced) = match outcome {
        DeployOutcome::Deployed {
            deployment,
            replaced,
        } => (deployment, replaced),
        other => panic!("unexpected outcome: {other:?}"),
    };

    let replaced = replaced.expect("previous row is reported");
    assert_eq!(replaced.id, first.id);
    assert_eq!(replaced.status().unwrap(), DeploymentStatus::Replaced);
    assert!(replaced.removed_at.is_some());
    replaced.check_consistency().unwrap();

    let active = ExampleDeploymentRepo::find_active(&pool, course.id, "week1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, second.id);
    assert_eq!(active.version_tag, "v2");

    let history = DeploymentHistoryRepo::list_for_course(&pool, course.id, Some("week1"), 10, 0)
        .await
        .unwrap();
    let actions: Vec<&str> = history.iter().map(|h| h.action.as_str()).collect();
    assert_eq!(actions, vec!["updated", "created"]);
    assert_eq!(history[0].previous_version_tag.as_deref(), Some("v1"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_example_or_version_writes_nothing(pool: PgPool) {
    let course = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1"]).await;

    assert_matches!(
        ExampleDeploymentRepo::deploy(&pool, course.id, &deploy_request("nope", None, "a"), None)
            .await
            .unwrap(),
        DeployOutcome::ExampleNotFound
    );
    assert_matches!(
        ExampleDeploymentRepo::deploy(&pool, course.id, &deploy_request("hello", Some("v7"), "a"), None)
            .await
            .unwrap(),
        DeployOutcome::VersionNotFound
    );

    let total = DeploymentHistoryRepo::count_for_course(&pool, course.id, None)
        .await
        .unwrap();
    assert_eq!(total, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_uncommitted_deploy_leaves_prior_row_active(pool: PgPool) {
    let course = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1", "v2"]).await;

    let first = deployed(
        ExampleDeploymentRepo::deploy(&pool, course.id, &deploy_request("hello", Some("v1"), "week1"), None)
            .await
            .unwrap(),
    );

    {
        let mut tx = pool.begin().await.unwrap();
        let outcome = ExampleDeploymentRepo::deploy_in_tx(
            &mut tx,
            course.id,
            &deploy_request("hello", Some("v2"), "week1"),
            None,
        )
        .await
        .unwrap();
        assert_matches!(outcome, DeployOutcome::Deployed { .. });
        // Dropped without commit: rolled back.
    }

    let active = ExampleDeploymentRepo::find_active(&pool, course.id, "week1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, first.id);
    assert_eq!(active.version_tag, "v1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_deploys_leave_exactly_one_active(pool: PgPool) {
    let course = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1", "v2"]).await;

    let req_a = deploy_request("hello", Some("v1"), "week1");
    let req_b = deploy_request("hello", Some("v2"), "week1");
    let (a, b) = tokio::join!(
        ExampleDeploymentRepo::deploy(&pool, course.id, &req_a, None),
        ExampleDeploymentRepo::deploy(&pool, course.id, &req_b, None),
    );
    assert_matches!(a.unwrap(), DeployOutcome::Deployed { .. });
    assert_matches!(b.unwrap(), DeployOutcome::Deployed { .. });

    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM example_deployments
         WHERE course_id = $1 AND deployment_path = 'week1' AND status = 'active'",
    )
    .bind(course.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(active, 1);

    let replaced: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM example_deployments
         WHERE course_id = $1 AND status = 'replaced' AND removed_at IS NOT NULL",
    )
    .bind(course.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(replaced, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_remove_only_affects_active_rows(pool: PgPool) {
    let course = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1"]).await;

    let deployment = deployed(
        ExampleDeploymentRepo::deploy(&pool, course.id, &deploy_request("hello", None, "week1"), None)
            .await
            .unwrap(),
    );

    let removed = ExampleDeploymentRepo::remove(&pool, course.id, deployment.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.status().unwrap(), DeploymentStatus::Removed);
    removed.check_consistency().unwrap();

    let again = ExampleDeploymentRepo::remove(&pool, course.id, deployment.id, None)
        .await
        .unwrap();
    assert!(again.is_none());

    assert!(ExampleDeploymentRepo::find_active(&pool, course.id, "week1")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_removed_status_without_timestamp_is_rejected(pool: PgPool) {
    let course = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1"]).await;
    let deployment = deployed(
        ExampleDeploymentRepo::deploy(&pool, course.id, &deploy_request("hello", None, "week1"), None)
            .await
            .unwrap(),
    );

    let err = sqlx::query("UPDATE example_deployments SET status = 'removed' WHERE id = $1")
        .bind(deployment.id)
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("ck_example_deployments_removed_at")
    );
}
