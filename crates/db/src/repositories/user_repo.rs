//! Repository for the `users` table.

use coursework_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User};

const COLUMNS: &str =
    "id, username, email, given_name, family_name, role, is_active, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a user. `role` defaults to `user`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, given_name, family_name, role)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'user'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.given_name)
            .bind(&input.family_name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Apply the non-`None` fields of `input`. `None` if the user is missing.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                email = COALESCE($2, email),
                given_name = COALESCE($3, given_name),
                family_name = COALESCE($4, family_name),
                role = COALESCE($5, role),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.given_name)
            .bind(&input.family_name)
            .bind(&input.role)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
