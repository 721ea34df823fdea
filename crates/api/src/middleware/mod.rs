//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated principal from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` system role.

pub mod auth;
pub mod rbac;
