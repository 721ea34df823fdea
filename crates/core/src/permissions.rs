//! Permission scopes.
//!
//! A permission check never answers yes/no for a list. It produces a
//! [`Scope`] that the `db` crate turns into a `WHERE` fragment, so callers
//! can keep filtering and paginating the narrowed query.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Course roles
// ---------------------------------------------------------------------------

/// Role of a user inside one course, ordered from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseRole {
    Owner,
    Maintainer,
    Lecturer,
    Tutor,
    Student,
}

impl CourseRole {
    pub const ALL: [CourseRole; 5] = [
        Self::Owner,
        Self::Maintainer,
        Self::Lecturer,
        Self::Tutor,
        Self::Student,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Maintainer => "maintainer",
            Self::Lecturer => "lecturer",
            Self::Tutor => "tutor",
            Self::Student => "student",
        }
    }

    /// Higher rank means more privilege.
    pub fn rank(self) -> u8 {
        match self {
            Self::Owner => 5,
            Self::Maintainer => 4,
            Self::Lecturer => 3,
            Self::Tutor => 2,
            Self::Student => 1,
        }
    }

    /// Every role name at or above `min`, for `role = ANY($n)` filters.
    pub fn at_least(min: CourseRole) -> Vec<String> {
        Self::ALL
            .into_iter()
            .filter(|role| role.rank() >= min.rank())
            .map(|role| role.as_str().to_string())
            .collect()
    }
}

impl fmt::Display for CourseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown course role '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Principal, actions, resources
// ---------------------------------------------------------------------------

/// An authenticated actor and its system role claim.
///
/// Always carries a user id: requests without a verified token are rejected
/// before a principal exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: DbId,
    pub role: String,
}

impl Principal {
    pub fn new(user_id: DbId, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_read(self) -> bool {
        matches!(self, Self::List | Self::Get)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Organization,
    Course,
    CourseMember,
    CourseContent,
    Example,
    Deployment,
    User,
}

/// The set of rows a principal may touch for one resource/action pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// No restriction.
    All,
    /// Rows whose course the principal belongs to with at least this role.
    CourseRole(CourseRole),
    /// No rows at all.
    Nothing,
}

/// Resolve the scope for a principal acting on a resource.
pub fn scope_for(principal: &Principal, resource: Resource, action: Action) -> Scope {
    if principal.is_admin() {
        return Scope::All;
    }

    match (resource, action.is_read()) {
        (Resource::Organization, true) => Scope::All,
        (Resource::Organization, false) => Scope::Nothing,

        (Resource::Course, true) => Scope::CourseRole(CourseRole::Student),
        (Resource::Course, false) => match action {
            Action::Update => Scope::CourseRole(CourseRole::Maintainer),
            _ => Scope::Nothing,
        },

        (Resource::CourseMember, true) => Scope::CourseRole(CourseRole::Tutor),
        (Resource::CourseMember, false) => Scope::CourseRole(CourseRole::Maintainer),

        (Resource::CourseContent, true) => Scope::CourseRole(CourseRole::Student),
        (Resource::CourseContent, false) => Scope::CourseRole(CourseRole::Lecturer),

        (Resource::Deployment, true) => Scope::CourseRole(CourseRole::Tutor),
        (Resource::Deployment, false) => Scope::CourseRole(CourseRole::Lecturer),

        // Examples are a global catalog; authoring needs lecturer rights in
        // at least one course.
        (Resource::Example, true) => Scope::All,
        (Resource::Example, false) => Scope::CourseRole(CourseRole::Lecturer),

        (Resource::User, _) => Scope::Nothing,
    }
}

/// Decide between 403 and 404 after a scoped single-row fetch came back empty.
pub fn visibility_error(entity: &'static str, id: DbId, exists_unfiltered: bool) -> CoreError {
    if exists_unfiltered {
        CoreError::Forbidden(format!("Not permitted to access {entity} {id}"))
    } else {
        CoreError::NotFound { entity, id }
    }
}

/// Reject outright when a scope grants nothing.
pub fn require_some(scope: Scope, what: &str) -> Result<Scope, CoreError> {
    match scope {
        Scope::Nothing => Err(CoreError::Forbidden(format!("Not permitted to {what}"))),
        other => Ok(other),
    }
}

/// Reject granting, changing or removing a course role above the caller's own.
///
/// `caller` is `None` for admins, who are not capped.
pub fn ensure_role_within(caller: Option<CourseRole>, role: CourseRole) -> Result<(), CoreError> {
    match caller {
        Some(own) if role.rank() > own.rank() => Err(CoreError::Forbidden(format!(
            "A {own} cannot manage the {role} role"
        ))),
        _ => Ok(()),
    }
}
