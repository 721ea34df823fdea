//! Repository for the `course_members` table.

use coursework_core::permissions::{CourseRole, Principal, Scope};
use coursework_core::types::DbId;
use sqlx::PgPool;

use crate::models::course_member::{CourseMember, CreateCourseMember, UpdateCourseMember};
use crate::scope::ScopedQuery;

const COLUMNS: &str = "id, course_id, user_id, role, created_at, updated_at";

pub struct CourseMemberRepo;

impl CourseMemberRepo {
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateCourseMember,
    ) -> Result<CourseMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_members (course_id, user_id, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseMember>(&query)
            .bind(course_id)
            .bind(input.user_id)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_course(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
    ) -> Result<Option<CourseMember>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM course_members WHERE id = $1 AND course_id = $2");
        sqlx::query_as::<_, CourseMember>(&query)
            .bind(id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        principal: &Principal,
        scope: Scope,
        course_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CourseMember>, sqlx::Error> {
        let mut builder = ScopedQuery::new(&format!("SELECT {COLUMNS} FROM course_members"))
            .restrict(principal, scope, "course_id")
            .eq("course_id", course_id)
            .page("id", limit, offset)
            .into_builder();
        builder.build_query_as::<CourseMember>().fetch_all(pool).await
    }

    pub async fn count(
        pool: &PgPool,
        principal: &Principal,
        scope: Scope,
        course_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let mut builder = ScopedQuery::new("SELECT COUNT(*) FROM course_members")
            .restrict(principal, scope, "course_id")
            .eq("course_id", course_id)
            .into_builder();
        builder.build_query_scalar::<i64>().fetch_one(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
        input: &UpdateCourseMember,
    ) -> Result<Option<CourseMember>, sqlx::Error> {
        let query = format!(
            "UPDATE course_members SET role = $3
             WHERE id = $1 AND course_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseMember>(&query)
            .bind(id)
            .bind(course_id)
            .bind(&input.role)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, course_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM course_members WHERE id = $1 AND course_id = $2")
            .bind(id)
            .bind(course_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The role `user_id` holds in `course_id`, if a member.
    pub async fn role_of(
        pool: &PgPool,
        course_id: DbId,
        user_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT role FROM course_members WHERE course_id = $1 AND user_id = $2")
            .bind(course_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `user_id` holds at least `min` in any course.
    pub async fn has_role_anywhere(
        pool: &PgPool,
        user_id: DbId,
        min: CourseRole,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM course_members WHERE user_id = $1 AND role = ANY($2))",
        )
        .bind(user_id)
        .bind(CourseRole::at_least(min))
        .fetch_one(pool)
        .await
    }
}
