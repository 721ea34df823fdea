//! Example (reusable content template) model and DTOs.

use coursework_core::dto::{from_validation_errors, EntityInterface};
use coursework_core::error::CoreError;
use coursework_core::path::canonicalize;
use coursework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const MAX_TAGS: usize = 32;
pub const MAX_TAG_LEN: usize = 64;

/// A row from the `examples` table. `identifier` never changes after
/// creation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Example {
    pub id: DbId,
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExample {
    pub identifier: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateExample {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn check_tags(tags: &[String]) -> Result<(), CoreError> {
    if tags.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "tags: at most {MAX_TAGS} allowed"
        )));
    }
    if let Some(bad) = tags
        .iter()
        .find(|t| t.trim().is_empty() || t.len() > MAX_TAG_LEN)
    {
        return Err(CoreError::Validation(format!("tags: invalid tag '{bad}'")));
    }
    Ok(())
}

/// Trim, lowercase and de-duplicate tags, keeping first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

impl EntityInterface for CreateExample {
    const ENTITY: &'static str = "example";

    fn validate(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)?;
        canonicalize(&self.identifier)?;
        check_tags(&self.tags)
    }

    fn to_storage(mut self) -> Result<Self, CoreError> {
        EntityInterface::validate(&self)?;
        self.identifier = canonicalize(&self.identifier)?;
        self.tags = normalize_tags(self.tags);
        Ok(self)
    }
}

impl UpdateExample {
    pub fn check(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(from_validation_errors)?;
        if let Some(tags) = &self.tags {
            check_tags(tags)?;
        }
        Ok(())
    }

    pub fn normalized(mut self) -> Self {
        self.tags = self.tags.map(normalize_tags);
        self
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn create(identifier: &str, tags: &[&str]) -> CreateExample {
        CreateExample {
            identifier: identifier.to_string(),
            title: "Hello".to_string(),
            description: None,
            category: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn identifier_is_canonicalized_and_tags_normalized() {
        let stored = create("python/basics/hello", &[" Intro", "intro", "loops"])
            .to_storage()
            .unwrap();
        assert_eq!(stored.identifier, "python.basics.hello");
        assert_eq!(stored.tags, vec!["intro", "loops"]);
    }

    #[test]
    fn bad_identifier_or_tags_are_rejected() {
        assert_matches!(
            EntityInterface::validate(&create("Python.Basics", &[])),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            EntityInterface::validate(&create("ok", &["  "])),
            Err(CoreError::Validation(_))
        );
    }
}
