//! Repository for the `course_content_deployments` table.
//!
//! Each course content has at most one row. Assigning an example moves it to
//! `pending`; external task runners then report progress through
//! [`update_status`](CourseContentDeploymentRepo::update_status).

use coursework_core::deployment::{DeploymentStatus, HistoryAction, VersionSelector};
use coursework_core::types::DbId;
use sqlx::PgPool;

use crate::models::course_content_deployment::{
    AssignExample, CourseContentDeployment, DeploymentStatusReport,
};
use crate::models::deployment_history::NewDeploymentHistory;
use crate::repositories::{DeploymentHistoryRepo, ExampleRepo, ExampleVersionRepo};

const COLUMNS: &str = "id, course_content_id, example_version_id, example_identifier, \
    version_tag, deployment_status, workflow_id, deployment_message, deployment_metadata, \
    assigned_at, deployed_at, last_attempt_at, created_at, updated_at";

/// The content a deployment belongs to, as history needs it.
#[derive(Debug, Clone, Copy)]
pub struct ContentRef<'a> {
    pub course_id: DbId,
    pub content_id: DbId,
    pub path: &'a str,
}

#[derive(Debug)]
pub enum AssignOutcome {
    Assigned(CourseContentDeployment),
    ExampleNotFound,
    VersionNotFound,
}

pub struct CourseContentDeploymentRepo;

impl CourseContentDeploymentRepo {
    pub async fn find_by_content(
        pool: &PgPool,
        content_id: DbId,
    ) -> Result<Option<CourseContentDeployment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM course_content_deployments WHERE course_content_id = $1");
        sqlx::query_as::<_, CourseContentDeployment>(&query)
            .bind(content_id)
            .fetch_optional(pool)
            .await
    }

    /// Assign an example version to a content, resetting any previous
    /// assignment to `pending` with cleared task-runner fields.
    pub async fn assign(
        pool: &PgPool,
        content: ContentRef<'_>,
        input: &AssignExample,
        assigned_by: Option<DbId>,
    ) -> Result<AssignOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(example) =
            ExampleRepo::find_by_identifier(&mut *tx, &input.example_identifier).await?
        else {
            return Ok(AssignOutcome::ExampleNotFound);
        };
        let selector = VersionSelector::parse(input.version_tag.as_deref());
        let Some(version) = ExampleVersionRepo::resolve(&mut *tx, example.id, &selector).await?
        else {
            return Ok(AssignOutcome::VersionNotFound);
        };

        let previous: Option<String> = sqlx::query_scalar(
            "SELECT version_tag FROM course_content_deployments
             WHERE course_content_id = $1 AND deployment_status <> 'removed'
             FOR UPDATE",
        )
        .bind(content.content_id)
        .fetch_optional(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO course_content_deployments
                (course_content_id, example_version_id, example_identifier, version_tag,
                 deployment_status, assigned_at)
             VALUES ($1, $2, $3, $4, 'pending', NOW())
             ON CONFLICT (course_content_id) DO UPDATE SET
                example_version_id = EXCLUDED.example_version_id,
                example_identifier = EXCLUDED.example_identifier,
                version_tag = EXCLUDED.version_tag,
                deployment_status = 'pending',
                workflow_id = NULL,
                deployment_message = NULL,
                deployment_metadata = '{{}}'::jsonb,
                assigned_at = NOW(),
                deployed_at = NULL,
                last_attempt_at = NULL
             RETURNING {COLUMNS}"
        );
        let deployment = sqlx::query_as::<_, CourseContentDeployment>(&query)
            .bind(content.content_id)
            .bind(version.id)
            .bind(&example.identifier)
            .bind(&version.version_tag)
            .fetch_one(&mut *tx)
            .await?;

        DeploymentHistoryRepo::append(
            &mut *tx,
            &NewDeploymentHistory {
                course_id: content.course_id,
                example_deployment_id: None,
                course_content_deployment_id: Some(deployment.id),
                action: if previous.is_some() {
                    HistoryAction::Updated
                } else {
                    HistoryAction::Created
                },
                deployment_path: Some(content.path.to_string()),
                example_version_id: Some(version.id),
                example_identifier: example.identifier.clone(),
                version_tag: version.version_tag.clone(),
                previous_version_tag: previous,
                metadata: None,
                workflow_id: None,
                created_by: assigned_by,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(AssignOutcome::Assigned(deployment))
    }

    /// Apply a task-runner status report.
    ///
    /// `active` stamps `deployed_at`; `failed` appends a history entry.
    /// Reported metadata is merged into the stored metadata. Returns `None`
    /// if the content has no live assignment.
    pub async fn update_status(
        pool: &PgPool,
        content: ContentRef<'_>,
        status: DeploymentStatus,
        report: &DeploymentStatusReport,
    ) -> Result<Option<CourseContentDeployment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE course_content_deployments SET
                deployment_status = $2,
                workflow_id = COALESCE($3, workflow_id),
                deployment_message = $4,
                deployment_metadata = deployment_metadata || COALESCE($5, '{{}}'::jsonb),
                last_attempt_at = NOW(),
                deployed_at = CASE WHEN $2 = 'active' THEN NOW() ELSE deployed_at END
             WHERE course_content_id = $1 AND deployment_status <> 'removed'
             RETURNING {COLUMNS}"
        );
        let Some(deployment) = sqlx::query_as::<_, CourseContentDeployment>(&query)
            .bind(content.content_id)
            .bind(status.as_str())
            .bind(&report.workflow_id)
            .bind(&report.message)
            .bind(&report.metadata)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if status == DeploymentStatus::Failed {
            DeploymentHistoryRepo::append(
                &mut *tx,
                &NewDeploymentHistory {
                    course_id: content.course_id,
                    example_deployment_id: None,
                    course_content_deployment_id: Some(deployment.id),
                    action: HistoryAction::Failed,
                    deployment_path: Some(content.path.to_string()),
                    example_version_id: deployment.example_version_id,
                    example_identifier: deployment.example_identifier.clone(),
                    version_tag: deployment.version_tag.clone(),
                    previous_version_tag: None,
                    metadata: report.metadata.clone(),
                    workflow_id: deployment.workflow_id.clone(),
                    created_by: None,
                },
            )
            .await?;
        }

        tx.commit().await?;
        tracing::info!(
            content_id = content.content_id,
            status = status.as_str(),
            workflow_id = ?deployment.workflow_id,
            "Content deployment status updated"
        );
        Ok(Some(deployment))
    }

    /// Flip a live assignment to `removed` and record it.
    pub async fn unassign(
        pool: &PgPool,
        content: ContentRef<'_>,
        removed_by: Option<DbId>,
    ) -> Result<Option<CourseContentDeployment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE course_content_deployments SET deployment_status = 'removed'
             WHERE course_content_id = $1 AND deployment_status <> 'removed'
             RETURNING {COLUMNS}"
        );
        let Some(deployment) = sqlx::query_as::<_, CourseContentDeployment>(&query)
            .bind(content.content_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        DeploymentHistoryRepo::append(
            &mut *tx,
            &NewDeploymentHistory {
                course_id: content.course_id,
                example_deployment_id: None,
                course_content_deployment_id: Some(deployment.id),
                action: HistoryAction::Removed,
                deployment_path: Some(content.path.to_string()),
                example_version_id: deployment.example_version_id,
                example_identifier: deployment.example_identifier.clone(),
                version_tag: deployment.version_tag.clone(),
                previous_version_tag: None,
                metadata: None,
                workflow_id: deployment.workflow_id.clone(),
                created_by: removed_by,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Some(deployment))
    }
}
