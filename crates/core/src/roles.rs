//! Well-known system role name constants.
//!
//! These must match the `ck_users_role` check constraint in
//! `20240101000001_create_users.up.sql`. Course-level roles live in
//! [`crate::permissions::CourseRole`].

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// All valid system role names.
pub const SYSTEM_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_USER];
