//! Integration tests for content deployments and the append-only history.

mod common;

use coursework_core::deployment::DeploymentStatus;
use coursework_db::models::course_content::CreateCourseContent;
use coursework_db::models::course_content_deployment::{
    AssignExample, DeploymentStatusReport, ReportedStatus,
};
use coursework_db::repositories::{
    AssignOutcome, ContentRef, CourseContentDeploymentRepo, CourseContentRepo,
    DeploymentHistoryRepo,
};
use serde_json::json;
use sqlx::PgPool;

use common::{course, example_with_versions};

async fn content(pool: &PgPool, course_id: i64, path: &str) -> i64 {
    CourseContentRepo::create(
        pool,
        course_id,
        &CreateCourseContent {
            path: path.to_string(),
            title: "Assignment".to_string(),
            description: None,
            kind: None,
            position: None,
            max_submissions: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn assign(tag: Option<&str>) -> AssignExample {
    AssignExample {
        example_identifier: "hello".to_string(),
        version_tag: tag.map(str::to_string),
    }
}

fn report(status: &str, workflow: Option<&str>) -> DeploymentStatusReport {
    DeploymentStatusReport {
        status: ReportedStatus::Name(status.to_string()),
        workflow_id: workflow.map(str::to_string),
        message: None,
        metadata: Some(json!({ "attempt": 1 })),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assign_then_runner_reports_active(pool: PgPool) {
    let c = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1", "v2"]).await;
    let content_id = content(&pool, c.id, "week1.hello").await;
    let target = ContentRef {
        course_id: c.id,
        content_id,
        path: "week1.hello",
    };

    let assigned = match CourseContentDeploymentRepo::assign(&pool, target, &assign(None), None)
        .await
        .unwrap()
    {
        AssignOutcome::Assigned(d) => d,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(assigned.deployment_status, "pending");
    assert_eq!(assigned.version_tag, "v2");

    let running = CourseContentDeploymentRepo::update_status(
        &pool,
        target,
        DeploymentStatus::Deploying,
        &report("deploying", Some("wf-1")),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(running.workflow_id.as_deref(), Some("wf-1"));
    assert!(running.deployed_at.is_none());

    let done = CourseContentDeploymentRepo::update_status(
        &pool,
        target,
        DeploymentStatus::Active,
        &report("active", None),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(done.deployment_status, "active");
    assert_eq!(done.workflow_id.as_deref(), Some("wf-1"), "workflow id is kept");
    assert!(done.deployed_at.is_some());
    assert_eq!(done.deployment_metadata["attempt"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reassign_resets_runner_fields(pool: PgPool) {
    let c = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1", "v2"]).await;
    let content_id = content(&pool, c.id, "week1").await;
    let target = ContentRef {
        course_id: c.id,
        content_id,
        path: "week1",
    };

    CourseContentDeploymentRepo::assign(&pool, target, &assign(Some("v1")), None)
        .await
        .unwrap();
    CourseContentDeploymentRepo::update_status(
        &pool,
        target,
        DeploymentStatus::Failed,
        &report("failed", Some("wf-1")),
    )
    .await
    .unwrap();

    let reassigned = match CourseContentDeploymentRepo::assign(&pool, target, &assign(Some("v2")), None)
        .await
        .unwrap()
    {
        AssignOutcome::Assigned(d) => d,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(reassigned.deployment_status, "pending");
    assert_eq!(reassigned.version_tag, "v2");
    assert!(reassigned.workflow_id.is_none());

    let history = DeploymentHistoryRepo::list_for_course(&pool, c.id, Some("week1"), 10, 0)
        .await
        .unwrap();
    let actions: Vec<&str> = history.iter().map(|h| h.action.as_str()).collect();
    assert_eq!(actions, vec!["updated", "failed", "created"]);
    assert_eq!(history[0].previous_version_tag.as_deref(), Some("v1"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unassign_is_recorded_and_blocks_callbacks(pool: PgPool) {
    let c = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1"]).await;
    let content_id = content(&pool, c.id, "week1").await;
    let target = ContentRef {
        course_id: c.id,
        content_id,
        path: "week1",
    };

    CourseContentDeploymentRepo::assign(&pool, target, &assign(None), None)
        .await
        .unwrap();
    let removed = CourseContentDeploymentRepo::unassign(&pool, target, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.deployment_status, "removed");

    let late = CourseContentDeploymentRepo::update_status(
        &pool,
        target,
        DeploymentStatus::Active,
        &report("active", None),
    )
    .await
    .unwrap();
    assert!(late.is_none(), "callbacks after removal are ignored");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_rows_cannot_be_updated(pool: PgPool) {
    let c = course(&pool, "cs101").await;
    example_with_versions(&pool, "hello", &["v1"]).await;
    let content_id = content(&pool, c.id, "week1").await;
    CourseContentDeploymentRepo::assign(
        &pool,
        ContentRef {
            course_id: c.id,
            content_id,
            path: "week1",
        },
        &assign(None),
        None,
    )
    .await
    .unwrap();

    let result = sqlx::query("UPDATE deployment_history SET version_tag = 'tampered'")
        .execute(&pool)
        .await;
    assert!(result.is_err());

    let history = DeploymentHistoryRepo::list_for_course(&pool, c.id, None, 10, 0)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version_tag, "v1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_survives_example_deletion(pool: PgPool) {
    let c = course(&pool, "cs101").await;
    let example = example_with_versions(&pool, "hello", &["v1"]).await;
    let content_id = content(&pool, c.id, "week1").await;
    CourseContentDeploymentRepo::assign(
        &pool,
        ContentRef {
            course_id: c.id,
            content_id,
            path: "week1",
        },
        &assign(None),
        None,
    )
    .await
    .unwrap();

    coursework_db::repositories::ExampleRepo::delete(&pool, example.id)
        .await
        .unwrap();

    let deployment = CourseContentDeploymentRepo::find_by_content(&pool, content_id)
        .await
        .unwrap()
        .unwrap();
    assert!(deployment.example_version_id.is_none());
    assert_eq!(deployment.example_identifier, "hello");

    let history = DeploymentHistoryRepo::list_for_course(&pool, c.id, None, 10, 0)
        .await
        .unwrap();
    assert_eq!(history[0].example_identifier, "hello");
    assert!(history[0].example_version_id.is_some());
}
