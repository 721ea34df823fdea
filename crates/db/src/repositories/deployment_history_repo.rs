//! Repository for the append-only `deployment_history` table.
//!
//! There is no update or delete here; the table also rejects
//! updates with a trigger.

use coursework_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::deployment_history::{DeploymentHistory, NewDeploymentHistory};
use crate::scope::ScopedQuery;

const COLUMNS: &str = "id, course_id, example_deployment_id, course_content_deployment_id, \
    action, deployment_path, example_version_id, example_identifier, version_tag, \
    previous_version_tag, metadata, workflow_id, created_by, created_at";

pub struct DeploymentHistoryRepo;

impl DeploymentHistoryRepo {
    /// Append one entry. Runs on the caller's executor so it joins the
    /// caller's transaction.
    pub async fn append<'e, E>(
        executor: E,
        entry: &NewDeploymentHistory,
    ) -> Result<DeploymentHistory, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO deployment_history
                (course_id, example_deployment_id, course_content_deployment_id, action,
                 deployment_path, example_version_id, example_identifier, version_tag,
                 previous_version_tag, metadata, workflow_id, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, '{{}}'::jsonb), $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeploymentHistory>(&query)
            .bind(entry.course_id)
            .bind(entry.example_deployment_id)
            .bind(entry.course_content_deployment_id)
            .bind(entry.action.as_str())
            .bind(&entry.deployment_path)
            .bind(entry.example_version_id)
            .bind(&entry.example_identifier)
            .bind(&entry.version_tag)
            .bind(&entry.previous_version_tag)
            .bind(&entry.metadata)
            .bind(&entry.workflow_id)
            .bind(entry.created_by)
            .fetch_one(executor)
            .await
    }

    fn filtered<'a>(select: &str, course_id: DbId, path: Option<String>) -> ScopedQuery<'a> {
        ScopedQuery::new(select)
            .eq("course_id", course_id)
            .eq_opt("deployment_path", path)
    }

    /// History of a course, newest first, optionally for a single path.
    pub async fn list_for_course(
        pool: &PgPool,
        course_id: DbId,
        path: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DeploymentHistory>, sqlx::Error> {
        let select = format!("SELECT {COLUMNS} FROM deployment_history");
        let mut builder = Self::filtered(&select, course_id, path.map(str::to_string))
            .page("created_at DESC, id DESC", limit, offset)
            .into_builder();
        builder
            .build_query_as::<DeploymentHistory>()
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_course(
        pool: &PgPool,
        course_id: DbId,
        path: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let mut builder = Self::filtered(
            "SELECT COUNT(*) FROM deployment_history",
            course_id,
            path.map(str::to_string),
        )
        .into_builder();
        builder.build_query_scalar::<i64>().fetch_one(pool).await
    }
}
