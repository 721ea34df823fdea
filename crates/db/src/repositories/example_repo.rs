//! Repository for the `examples` table.

use coursework_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::example::{CreateExample, Example, UpdateExample};
use crate::scope::ScopedQuery;

const COLUMNS: &str =
    "id, identifier, title, description, category, tags, created_by, created_at, updated_at";

/// Optional filters for listing examples.
#[derive(Debug, Clone, Default)]
pub struct ExampleFilter {
    pub category: Option<String>,
    /// Match a single tag.
    pub tag: Option<String>,
    /// Canonical identifier; matches it and everything beneath it.
    pub under: Option<String>,
}

pub struct ExampleRepo;

impl ExampleRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateExample,
        created_by: Option<DbId>,
    ) -> Result<Example, sqlx::Error> {
        let query = format!(
            "INSERT INTO examples (identifier, title, description, category, tags, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Example>(&query)
            .bind(&input.identifier)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.tags)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Example>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM examples WHERE id = $1");
        sqlx::query_as::<_, Example>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_identifier<'e, E>(
        executor: E,
        identifier: &str,
    ) -> Result<Option<Example>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM examples WHERE identifier = $1");
        sqlx::query_as::<_, Example>(&query)
            .bind(identifier)
            .fetch_optional(executor)
            .await
    }

    fn filtered<'a>(select: &str, filter: &ExampleFilter) -> ScopedQuery<'a> {
        let mut query = ScopedQuery::new(select).eq_opt("category", filter.category.clone());
        if let Some(tag) = &filter.tag {
            query = query.bound("", tag.clone(), " = ANY(tags)");
        }
        if let Some(under) = &filter.under {
            // `a` matches `a` and `a.b` but not `ab`.
            query = query.bound("starts_with(identifier || '.', ", format!("{under}."), ")");
        }
        query
    }

    pub async fn list(
        pool: &PgPool,
        filter: &ExampleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Example>, sqlx::Error> {
        let select = format!("SELECT {COLUMNS} FROM examples");
        let mut builder = Self::filtered(&select, filter)
            .page("identifier", limit, offset)
            .into_builder();
        builder.build_query_as::<Example>().fetch_all(pool).await
    }

    pub async fn count(pool: &PgPool, filter: &ExampleFilter) -> Result<i64, sqlx::Error> {
        let mut builder = Self::filtered("SELECT COUNT(*) FROM examples", filter).into_builder();
        builder.build_query_scalar::<i64>().fetch_one(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateExample,
    ) -> Result<Option<Example>, sqlx::Error> {
        let query = format!(
            "UPDATE examples SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                tags = COALESCE($5, tags)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Example>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.tags)
            .fetch_optional(pool)
            .await
    }

    /// Versions cascade; deployments keep their snapshot fields.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM examples WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
