//! Repository for the `example_deployments` table.
//!
//! Deploying replaces whatever is active at `(course_id, deployment_path)`.
//! The replacement runs in one transaction serialized by an advisory lock on
//! that pair, with the partial unique index `uq_example_deployments_active`
//! as the backstop.

use coursework_core::deployment::{HistoryAction, VersionSelector};
use coursework_core::permissions::{Principal, Scope};
use coursework_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::deployment_history::NewDeploymentHistory;
use crate::models::example_deployment::{DeployExample, ExampleDeployment};
use crate::repositories::{DeploymentHistoryRepo, ExampleRepo, ExampleVersionRepo};
use crate::scope::ScopedQuery;

const COLUMNS: &str = "id, course_id, deployment_path, example_version_id, example_identifier, \
    version_tag, status, deployed_at, removed_at, deployed_by, metadata, created_at, updated_at";

/// Result of a deploy attempt.
#[derive(Debug)]
pub enum DeployOutcome {
    Deployed {
        deployment: ExampleDeployment,
        /// The previously active row, now `replaced`.
        replaced: Option<ExampleDeployment>,
    },
    ExampleNotFound,
    VersionNotFound,
}

/// Optional filters for listing deployments of a course.
#[derive(Debug, Clone, Default)]
pub struct DeploymentFilter {
    pub path: Option<String>,
    /// Also return replaced, removed and failed rows.
    pub include_inactive: bool,
}

pub struct ExampleDeploymentRepo;

impl ExampleDeploymentRepo {
    /// Deploy an example version, replacing the active deployment at the same
    /// path. Nothing is written unless the example and version resolve.
    pub async fn deploy(
        pool: &PgPool,
        course_id: DbId,
        input: &DeployExample,
        deployed_by: Option<DbId>,
    ) -> Result<DeployOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let outcome = Self::deploy_in_tx(&mut tx, course_id, input, deployed_by).await?;
        if matches!(outcome, DeployOutcome::Deployed { .. }) {
            tx.commit().await?;
        }
        Ok(outcome)
    }

    /// The steps of [`deploy`](Self::deploy) on a caller-owned transaction.
    /// The caller decides whether to commit.
    pub async fn deploy_in_tx(
        conn: &mut PgConnection,
        course_id: DbId,
        input: &DeployExample,
        deployed_by: Option<DbId>,
    ) -> Result<DeployOutcome, sqlx::Error> {
        let Some(example) =
            ExampleRepo::find_by_identifier(&mut *conn, &input.example_identifier).await?
        else {
            return Ok(DeployOutcome::ExampleNotFound);
        };

        let selector = VersionSelector::parse(input.version_tag.as_deref());
        let Some(version) = ExampleVersionRepo::resolve(&mut *conn, example.id, &selector).await?
        else {
            return Ok(DeployOutcome::VersionNotFound);
        };

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("example_deployment:{course_id}:{}", input.deployment_path))
            .execute(&mut *conn)
            .await?;

        let query = format!(
            "UPDATE example_deployments SET status = 'replaced', removed_at = NOW()
             WHERE id = (
                 SELECT id FROM example_deployments
                 WHERE course_id = $1 AND deployment_path = $2 AND status = 'active'
                 FOR UPDATE
             )
             RETURNING {COLUMNS}"
        );
        let replaced = sqlx::query_as::<_, ExampleDeployment>(&query)
            .bind(course_id)
            .bind(&input.deployment_path)
            .fetch_optional(&mut *conn)
            .await?;

        let query = format!(
            "INSERT INTO example_deployments
                (course_id, deployment_path, example_version_id, example_identifier,
                 version_tag, status, deployed_by, metadata)
             VALUES ($1, $2, $3, $4, $5, 'active', $6, COALESCE($7, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        let deployment = sqlx::query_as::<_, ExampleDeployment>(&query)
            .bind(course_id)
            .bind(&input.deployment_path)
            .bind(version.id)
            .bind(&example.identifier)
            .bind(&version.version_tag)
            .bind(deployed_by)
            .bind(&input.metadata)
            .fetch_one(&mut *conn)
            .await?;

        let action = if replaced.is_some() {
            HistoryAction::Updated
        } else {
            HistoryAction::Created
        };
        DeploymentHistoryRepo::append(
            &mut *conn,
            &NewDeploymentHistory {
                course_id,
                example_deployment_id: Some(deployment.id),
                course_content_deployment_id: None,
                action,
                deployment_path: Some(deployment.deployment_path.clone()),
                example_version_id: Some(version.id),
                example_identifier: example.identifier.clone(),
                version_tag: version.version_tag.clone(),
                previous_version_tag: replaced.as_ref().map(|r| r.version_tag.clone()),
                metadata: input.metadata.clone(),
                workflow_id: None,
                created_by: deployed_by,
            },
        )
        .await?;

        tracing::info!(
            course_id,
            path = %deployment.deployment_path,
            example = %example.identifier,
            version = %version.version_tag,
            action = action.as_str(),
            "Example deployed"
        );
        Ok(DeployOutcome::Deployed {
            deployment,
            replaced,
        })
    }

    /// Mark the active deployment `removed` and record it in history.
    ///
    /// Returns `None` if no active deployment with this id exists in the
    /// course.
    pub async fn remove(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
        removed_by: Option<DbId>,
    ) -> Result<Option<ExampleDeployment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE example_deployments SET status = 'removed', removed_at = NOW()
             WHERE id = $1 AND course_id = $2 AND status = 'active'
             RETURNING {COLUMNS}"
        );
        let Some(removed) = sqlx::query_as::<_, ExampleDeployment>(&query)
            .bind(id)
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        DeploymentHistoryRepo::append(
            &mut *tx,
            &NewDeploymentHistory {
                course_id,
                example_deployment_id: Some(removed.id),
                course_content_deployment_id: None,
                action: HistoryAction::Removed,
                deployment_path: Some(removed.deployment_path.clone()),
                example_version_id: removed.example_version_id,
                example_identifier: removed.example_identifier.clone(),
                version_tag: removed.version_tag.clone(),
                previous_version_tag: None,
                metadata: None,
                workflow_id: None,
                created_by: removed_by,
            },
        )
        .await?;

        tx.commit().await?;
        tracing::info!(course_id, deployment_id = id, "Example deployment removed");
        Ok(Some(removed))
    }

    pub async fn find_in_course(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
    ) -> Result<Option<ExampleDeployment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM example_deployments WHERE id = $1 AND course_id = $2");
        sqlx::query_as::<_, ExampleDeployment>(&query)
            .bind(id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// The active deployment at a path, if any.
    pub async fn find_active(
        pool: &PgPool,
        course_id: DbId,
        path: &str,
    ) -> Result<Option<ExampleDeployment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM example_deployments
             WHERE course_id = $1 AND deployment_path = $2 AND status = 'active'"
        );
        sqlx::query_as::<_, ExampleDeployment>(&query)
            .bind(course_id)
            .bind(path)
            .fetch_optional(pool)
            .await
    }

    fn filtered<'a>(
        select: &str,
        principal: &Principal,
        scope: Scope,
        course_id: DbId,
        filter: &DeploymentFilter,
    ) -> ScopedQuery<'a> {
        let query = ScopedQuery::new(select)
            .restrict(principal, scope, "course_id")
            .eq("course_id", course_id)
            .eq_opt("deployment_path", filter.path.clone());
        if filter.include_inactive {
            query
        } else {
            query.filter("status = 'active'")
        }
    }

    /// Deployments of a course: active only unless the filter asks for all.
    pub async fn list(
        pool: &PgPool,
        principal: &Principal,
        scope: Scope,
        course_id: DbId,
        filter: &DeploymentFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ExampleDeployment>, sqlx::Error> {
        let select = format!("SELECT {COLUMNS} FROM example_deployments");
        let mut builder = Self::filtered(&select, principal, scope, course_id, filter)
            .page("deployment_path, deployed_at DESC, id DESC", limit, offset)
            .into_builder();
        builder
            .build_query_as::<ExampleDeployment>()
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        principal: &Principal,
        scope: Scope,
        course_id: DbId,
        filter: &DeploymentFilter,
    ) -> Result<i64, sqlx::Error> {
        let mut builder = Self::filtered(
            "SELECT COUNT(*) FROM example_deployments",
            principal,
            scope,
            course_id,
            filter,
        )
        .into_builder();
        builder.build_query_scalar::<i64>().fetch_one(pool).await
    }
}
