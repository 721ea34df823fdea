//! Domain logic for the coursework backend.
//!
//! Nothing in this crate touches the database. The `db` crate persists what
//! these types describe and the `api` crate exposes it over HTTP.

pub mod deployment;
pub mod dto;
pub mod error;
pub mod git;
pub mod pagination;
pub mod path;
pub mod permissions;
pub mod roles;
pub mod types;
