//! Repository for the `organizations` table.

use coursework_core::types::DbId;
use sqlx::PgPool;

use crate::models::organization::{CreateOrganization, Organization, UpdateOrganization};

const COLUMNS: &str = "id, path, title, description, created_at, updated_at";

pub struct OrganizationRepo;

impl OrganizationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganization,
    ) -> Result<Organization, sqlx::Error> {
        let query = format!(
            "INSERT INTO organizations (path, title, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(&input.path)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List ordered by path, so parents precede their children.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Organization>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM organizations ORDER BY path LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Organization>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM organizations")
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrganization,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!(
            "UPDATE organizations SET
                title = COALESCE($2, title),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Deleting an organization cascades to its courses.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
