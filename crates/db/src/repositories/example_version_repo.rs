//! Repository for the `example_versions` table.
//!
//! Versions are immutable: there is no update, and deletion only happens
//! through the parent example's cascade.

use coursework_core::deployment::VersionSelector;
use coursework_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::example_version::{CreateExampleVersion, ExampleVersion};

const COLUMNS: &str =
    "id, example_id, version_number, version_tag, storage_path, meta, created_by, created_at";

pub struct ExampleVersionRepo;

impl ExampleVersionRepo {
    /// Insert the next version of an example.
    ///
    /// `version_number` is `MAX + 1` computed while holding a row lock on the
    /// parent example, so concurrent creates get distinct numbers. Returns
    /// `None` if the example does not exist.
    pub async fn create(
        pool: &PgPool,
        example_id: DbId,
        input: &CreateExampleVersion,
        created_by: Option<DbId>,
    ) -> Result<Option<ExampleVersion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM examples WHERE id = $1 FOR UPDATE")
                .bind(example_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO example_versions
                (example_id, version_number, version_tag, storage_path, meta, created_by)
             SELECT $1, COALESCE(MAX(version_number), 0) + 1, $2, $3,
                    COALESCE($4, '{{}}'::jsonb), $5
             FROM example_versions WHERE example_id = $1
             RETURNING {COLUMNS}"
        );
        let version = sqlx::query_as::<_, ExampleVersion>(&query)
            .bind(example_id)
            .bind(&input.version_tag)
            .bind(&input.storage_path)
            .bind(&input.meta)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(version))
    }

    /// Versions of an example, newest first.
    pub async fn list_for_example(
        pool: &PgPool,
        example_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ExampleVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM example_versions
             WHERE example_id = $1
             ORDER BY version_number DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ExampleVersion>(&query)
            .bind(example_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_example(pool: &PgPool, example_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM example_versions WHERE example_id = $1")
            .bind(example_id)
            .fetch_one(pool)
            .await
    }

    /// Every tag of an example, for cache invalidation.
    pub async fn tags_for_example(pool: &PgPool, example_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT version_tag FROM example_versions WHERE example_id = $1")
            .bind(example_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve a selector to a concrete version.
    ///
    /// A tag matches exactly; `latest` is the highest `version_number`.
    pub async fn resolve<'e, E>(
        executor: E,
        example_id: DbId,
        selector: &VersionSelector,
    ) -> Result<Option<ExampleVersion>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        match selector {
            VersionSelector::Latest => {
                let query = format!(
                    "SELECT {COLUMNS} FROM example_versions
                     WHERE example_id = $1
                     ORDER BY version_number DESC
                     LIMIT 1"
                );
                sqlx::query_as::<_, ExampleVersion>(&query)
                    .bind(example_id)
                    .fetch_optional(executor)
                    .await
            }
            VersionSelector::Tag(tag) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM example_versions
                     WHERE example_id = $1 AND version_tag = $2"
                );
                sqlx::query_as::<_, ExampleVersion>(&query)
                    .bind(example_id)
                    .bind(tag)
                    .fetch_optional(executor)
                    .await
            }
        }
    }
}
