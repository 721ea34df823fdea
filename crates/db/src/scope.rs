//! Permission-filtered query construction.
//!
//! A [`Scope`] resolved in core becomes SQL here. Every list and single-row
//! read that is subject to course membership goes through [`ScopedQuery`],
//! so the same filter applies to the page query and its `COUNT(*)`.

use coursework_core::permissions::{CourseRole, Principal, Scope};
use sqlx::{Encode, Postgres, QueryBuilder, Type};

pub struct ScopedQuery<'args> {
    builder: QueryBuilder<'args, Postgres>,
    has_where: bool,
}

impl<'args> ScopedQuery<'args> {
    /// Start from a `SELECT ... FROM ...` with no `WHERE` clause.
    pub fn new(base: &str) -> Self {
        Self {
            builder: QueryBuilder::new(base),
            has_where: false,
        }
    }

    fn conjunction(&mut self) -> &mut QueryBuilder<'args, Postgres> {
        if self.has_where {
            self.builder.push(" AND ");
        } else {
            self.builder.push(" WHERE ");
            self.has_where = true;
        }
        &mut self.builder
    }

    /// Narrow to the rows `principal` may see under `scope`.
    ///
    /// `course_column` is the (possibly qualified) column holding the course
    /// id of each row. A principal without a qualifying membership gets an
    /// empty result, never an error.
    pub fn restrict(mut self, principal: &Principal, scope: Scope, course_column: &str) -> Self {
        match scope {
            Scope::All => {}
            Scope::Nothing => {
                self.conjunction().push("FALSE");
            }
            Scope::CourseRole(min) => {
                self.conjunction()
                    .push(course_column)
                    .push(" IN (SELECT cm.course_id FROM course_members cm WHERE cm.user_id = ")
                    .push_bind(principal.user_id)
                    .push(" AND cm.role = ANY(")
                    .push_bind(CourseRole::at_least(min))
                    .push("))");
            }
        }
        self
    }

    /// `AND column = value`.
    pub fn eq<T>(mut self, column: &str, value: T) -> Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        self.conjunction().push(column).push(" = ").push_bind(value);
        self
    }

    /// `AND column = value` when `value` is present.
    pub fn eq_opt<T>(self, column: &str, value: Option<T>) -> Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        match value {
            Some(value) => self.eq(column, value),
            None => self,
        }
    }

    /// Append `before $n after` with `value` bound at `$n`.
    pub fn bound<T>(mut self, before: &str, value: T, after: &str) -> Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        self.conjunction().push(before).push_bind(value).push(after);
        self
    }

    /// Append a fixed predicate with no bound values.
    pub fn filter(mut self, predicate: &str) -> Self {
        self.conjunction().push(predicate);
        self
    }

    /// Append `ORDER BY`, `LIMIT` and `OFFSET`.
    pub fn page(mut self, order_by: &str, limit: i64, offset: i64) -> Self {
        self.builder
            .push(" ORDER BY ")
            .push(order_by)
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        self
    }

    pub fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub fn into_builder(self) -> QueryBuilder<'args, Postgres> {
        self.builder
    }
}
