//! Repository for the `course_contents` table.

use coursework_core::permissions::{Principal, Scope};
use coursework_core::types::DbId;
use sqlx::PgPool;

use crate::models::course_content::{CourseContent, CreateCourseContent, UpdateCourseContent};
use crate::scope::ScopedQuery;

const COLUMNS: &str = "id, course_id, path, title, description, kind, position, \
    max_submissions, archived_at, created_at, updated_at";

pub struct CourseContentRepo;

impl CourseContentRepo {
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateCourseContent,
    ) -> Result<CourseContent, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_contents
                (course_id, path, title, description, kind, position, max_submissions)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'assignment'), COALESCE($6, 0), $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseContent>(&query)
            .bind(course_id)
            .bind(&input.path)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.kind)
            .bind(input.position)
            .bind(input.max_submissions)
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_course(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
    ) -> Result<Option<CourseContent>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM course_contents WHERE id = $1 AND course_id = $2");
        sqlx::query_as::<_, CourseContent>(&query)
            .bind(id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    fn filtered<'a>(
        select: &str,
        principal: &Principal,
        scope: Scope,
        course_id: DbId,
        include_archived: bool,
    ) -> ScopedQuery<'a> {
        let query = ScopedQuery::new(select)
            .restrict(principal, scope, "course_id")
            .eq("course_id", course_id);
        if include_archived {
            query
        } else {
            query.filter("archived_at IS NULL")
        }
    }

    /// List in tree order: by path, then sibling position.
    pub async fn list(
        pool: &PgPool,
        principal: &Principal,
        scope: Scope,
        course_id: DbId,
        include_archived: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CourseContent>, sqlx::Error> {
        let select = format!("SELECT {COLUMNS} FROM course_contents");
        let mut builder = Self::filtered(&select, principal, scope, course_id, include_archived)
            .page("position, path", limit, offset)
            .into_builder();
        builder.build_query_as::<CourseContent>().fetch_all(pool).await
    }

    pub async fn count(
        pool: &PgPool,
        principal: &Principal,
        scope: Scope,
        course_id: DbId,
        include_archived: bool,
    ) -> Result<i64, sqlx::Error> {
        let mut builder = Self::filtered(
            "SELECT COUNT(*) FROM course_contents",
            principal,
            scope,
            course_id,
            include_archived,
        )
        .into_builder();
        builder.build_query_scalar::<i64>().fetch_one(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
        input: &UpdateCourseContent,
    ) -> Result<Option<CourseContent>, sqlx::Error> {
        let query = format!(
            "UPDATE course_contents SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                position = COALESCE($5, position),
                max_submissions = COALESCE($6, max_submissions),
                archived_at = CASE
                    WHEN $7 IS NULL THEN archived_at
                    WHEN $7 THEN COALESCE(archived_at, NOW())
                    ELSE NULL
                END
             WHERE id = $1 AND course_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseContent>(&query)
            .bind(id)
            .bind(course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.position)
            .bind(input.max_submissions)
            .bind(input.archived)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, course_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM course_contents WHERE id = $1 AND course_id = $2")
            .bind(id)
            .bind(course_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
