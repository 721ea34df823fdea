//! Source-control integration through the `git` binary.
//!
//! - [`url`] -- Recognizes git remote URLs and builds credential-embedded
//!   HTTPS clone URLs.
//! - [`client`] -- Clone-or-fetch of a working copy, always forcing it to the
//!   remote state.
//! - [`runner`] -- The [`CommandRunner`] port and its child-process
//!   implementation.

pub mod client;
pub mod runner;
pub mod url;

pub use client::{CloneRequest, GitClient, SyncOutcome};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
pub use url::{build_clone_url, clone_url, redact, GitUrl};

use crate::error::CoreError;

/// Errors from URL validation or git invocations.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Unrecognized git URL: {0}")]
    InvalidUrl(String),

    #[error("Token contains disallowed characters")]
    InvalidToken,

    #[error("Invalid user name '{0}'")]
    InvalidUser(String),

    #[error("Invalid branch name '{0}'")]
    InvalidBranch(String),

    #[error("Invalid commit '{0}'")]
    InvalidCommit(String),

    #[error("git {command} failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("git {command} timed out after {elapsed_ms}ms")]
    Timeout { command: String, elapsed_ms: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    /// Whether the error was raised before any I/O happened.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl(_)
                | Self::InvalidToken
                | Self::InvalidUser(_)
                | Self::InvalidBranch(_)
                | Self::InvalidCommit(_)
        )
    }
}

impl From<GitError> for CoreError {
    fn from(err: GitError) -> Self {
        if err.is_validation() {
            CoreError::Validation(err.to_string())
        } else {
            CoreError::Upstream(err.to_string())
        }
    }
}
