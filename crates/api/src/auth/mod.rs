//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token generation and validation.
//!
//! Tokens are issued by an external identity provider sharing the secret;
//! [`jwt::generate_access_token`] exists for tooling and tests.

pub mod jwt;
