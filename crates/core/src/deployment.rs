//! Deployment status, version selection and history actions.
//!
//! Course content deployments and example deployments share a single status
//! type. The canonical representation is the lowercase string stored in the
//! `TEXT` status columns. Task runners still report small integer codes; those
//! are translated through [`LEGACY_STATUS_CODES`] and nowhere else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Alias resolved to the highest `version_number` at deployment time.
pub const LATEST_ALIAS: &str = "latest";

/// Longest accepted version tag.
pub const MAX_VERSION_TAG_LEN: usize = 64;

// ---------------------------------------------------------------------------
// DeploymentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    /// Assigned, waiting for a task runner to pick it up.
    Pending,
    /// A task runner is working on it.
    Deploying,
    /// Live at its position.
    Active,
    /// The last attempt failed. The row stays in place for inspection.
    Failed,
    /// Superseded by a newer deployment at the same position.
    Replaced,
    /// Explicitly taken down.
    Removed,
}

/// Legacy integer codes reported by task runners, in lookup order.
///
/// | code | runner meaning | status      |
/// |------|----------------|-------------|
/// | 0    | finished       | `active`    |
/// | 1    | failed         | `failed`    |
/// | 2    | cancelled      | `failed`    |
/// | 3    | scheduled      | `pending`   |
/// | 4    | pending        | `pending`   |
/// | 5    | running        | `deploying` |
/// | 6    | crashed        | `failed`    |
pub const LEGACY_STATUS_CODES: &[(i16, DeploymentStatus)] = &[
    (0, DeploymentStatus::Active),
    (1, DeploymentStatus::Failed),
    (2, DeploymentStatus::Failed),
    (3, DeploymentStatus::Pending),
    (4, DeploymentStatus::Pending),
    (5, DeploymentStatus::Deploying),
    (6, DeploymentStatus::Failed),
];

impl DeploymentStatus {
    pub const ALL: [DeploymentStatus; 6] = [
        Self::Pending,
        Self::Deploying,
        Self::Active,
        Self::Failed,
        Self::Replaced,
        Self::Removed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Deploying => "deploying",
            Self::Active => "active",
            Self::Failed => "failed",
            Self::Replaced => "replaced",
            Self::Removed => "removed",
        }
    }

    /// Translate a task-runner integer code.
    pub fn from_legacy_code(code: i16) -> Option<Self> {
        LEGACY_STATUS_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, status)| *status)
    }

    /// The first legacy code that maps to this status, if any.
    ///
    /// `replaced` and `removed` have no runner equivalent.
    pub fn legacy_code(self) -> Option<i16> {
        LEGACY_STATUS_CODES
            .iter()
            .find(|(_, status)| *status == self)
            .map(|(code, _)| *code)
    }

    /// Whether a row in this status must carry `removed_at`.
    pub fn requires_removed_at(self) -> bool {
        matches!(self, Self::Replaced | Self::Removed)
    }

    /// Whether a task runner may report this status through the callback.
    pub fn is_runner_reportable(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Deploying | Self::Active | Self::Failed
        )
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown deployment status '{s}'")))
    }
}

/// Check the status/`removed_at` consistency invariant.
///
/// `removed` and `replaced` rows must have `removed_at` set; every other
/// status must have it `NULL`.
pub fn validate_removal_state(
    status: DeploymentStatus,
    removed_at: Option<Timestamp>,
) -> Result<(), CoreError> {
    match (status.requires_removed_at(), removed_at.is_some()) {
        (true, false) => Err(CoreError::Validation(format!(
            "Deployment in status '{status}' must have removed_at set"
        ))),
        (false, true) => Err(CoreError::Validation(format!(
            "Deployment in status '{status}' must not have removed_at set"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// VersionSelector
// ---------------------------------------------------------------------------

/// Which version of an example a deployment request refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// The version with the highest `version_number`.
    Latest,
    /// An exact `version_tag` match.
    Tag(String),
}

impl VersionSelector {
    /// Interpret an optional requested tag. Absent, blank or `latest` (any
    /// case) select the latest version.
    pub fn parse(requested: Option<&str>) -> Self {
        match requested.map(str::trim) {
            None | Some("") => Self::Latest,
            Some(tag) if tag.eq_ignore_ascii_case(LATEST_ALIAS) => Self::Latest,
            Some(tag) => Self::Tag(tag.to_string()),
        }
    }

    /// Human-readable form for error messages.
    pub fn describe(&self) -> &str {
        match self {
            Self::Latest => LATEST_ALIAS,
            Self::Tag(tag) => tag,
        }
    }
}

/// Validate a tag for a newly created version.
pub fn validate_version_tag(tag: &str) -> Result<(), CoreError> {
    if tag.is_empty() {
        return Err(CoreError::Validation("version_tag must not be empty".into()));
    }
    if tag.len() > MAX_VERSION_TAG_LEN {
        return Err(CoreError::Validation(format!(
            "version_tag must be at most {MAX_VERSION_TAG_LEN} characters"
        )));
    }
    if tag.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CoreError::Validation(
            "version_tag must not contain whitespace".into(),
        ));
    }
    if tag.eq_ignore_ascii_case(LATEST_ALIAS) {
        return Err(CoreError::Validation(
            "'latest' is a reserved alias and cannot be used as a version_tag".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// HistoryAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Created,
    Updated,
    Removed,
    Failed,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Removed => "removed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
