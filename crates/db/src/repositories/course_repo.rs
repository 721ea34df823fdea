//! Repository for the `courses` table.

use coursework_core::permissions::{Principal, Scope};
use coursework_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse, UpdateCourse};
use crate::scope::ScopedQuery;

const COLUMNS: &str = "id, organization_id, path, title, description, \
    repository_url, repository_branch, created_at, updated_at";

pub struct CourseRepo;

impl CourseRepo {
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses
                (organization_id, path, title, description, repository_url, repository_branch)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(input.organization_id)
            .bind(&input.path)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.repository_url)
            .bind(&input.repository_branch)
            .fetch_one(pool)
            .await
    }

    /// Unfiltered lookup.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lookup restricted to what `principal` may see under `scope`.
    pub async fn find_scoped(
        pool: &PgPool,
        principal: &Principal,
        scope: Scope,
        id: DbId,
    ) -> Result<Option<Course>, sqlx::Error> {
        let mut builder = ScopedQuery::new(&format!("SELECT {COLUMNS} FROM courses"))
            .restrict(principal, scope, "id")
            .eq("id", id)
            .into_builder();
        builder.build_query_as::<Course>().fetch_optional(pool).await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        principal: &Principal,
        scope: Scope,
        organization_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let mut builder = ScopedQuery::new(&format!("SELECT {COLUMNS} FROM courses"))
            .restrict(principal, scope, "id")
            .eq_opt("organization_id", organization_id)
            .page("organization_id, path", limit, offset)
            .into_builder();
        builder.build_query_as::<Course>().fetch_all(pool).await
    }

    pub async fn count(
        pool: &PgPool,
        principal: &Principal,
        scope: Scope,
        organization_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        let mut builder = ScopedQuery::new("SELECT COUNT(*) FROM courses")
            .restrict(principal, scope, "id")
            .eq_opt("organization_id", organization_id)
            .into_builder();
        builder.build_query_scalar::<i64>().fetch_one(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                repository_url = COALESCE($4, repository_url),
                repository_branch = COALESCE($5, repository_branch)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.repository_url)
            .bind(&input.repository_branch)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
