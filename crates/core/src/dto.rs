//! Entity DTO capability trait and a name-keyed validation registry.
//!
//! Each create DTO implements [`EntityInterface`]. The API validates request
//! bodies through the typed trait; [`EntityRegistry`] exposes the same rules
//! for untyped JSON so clients can dry-run a payload by entity name.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

pub trait EntityInterface: DeserializeOwned + Sized {
    /// Registry key, e.g. `"example"`.
    const ENTITY: &'static str;

    /// Field-level and semantic checks. Must not touch storage.
    fn validate(&self) -> Result<(), CoreError>;

    /// Validate, then normalize into the form the repository persists
    /// (canonical paths, trimmed names).
    fn to_storage(self) -> Result<Self, CoreError>;

    /// Decode an untyped payload.
    fn from_payload(payload: &Value) -> Result<Self, CoreError> {
        serde_json::from_value(payload.clone())
            .map_err(|e| CoreError::Validation(format!("Invalid {} payload: {e}", Self::ENTITY)))
    }
}

type PayloadValidator = fn(&Value) -> Result<(), CoreError>;

fn validate_payload<T: EntityInterface>(payload: &Value) -> Result<(), CoreError> {
    T::from_payload(payload)?.validate()
}

/// Maps entity names to type-erased payload validators.
#[derive(Default)]
pub struct EntityRegistry {
    validators: BTreeMap<&'static str, PayloadValidator>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: EntityInterface>(mut self) -> Self {
        self.validators.insert(T::ENTITY, validate_payload::<T>);
        self
    }

    /// Validate `payload` as a create request for `entity`.
    pub fn validate(&self, entity: &str, payload: &Value) -> Result<(), CoreError> {
        let validator = self
            .validators
            .get(entity)
            .ok_or_else(|| CoreError::NotFoundBy {
                entity: "EntityType",
                key: entity.to_string(),
            })?;
        validator(payload)
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.validators.contains_key(entity)
    }

    /// Registered entity names in sorted order.
    pub fn entities(&self) -> Vec<&'static str> {
        self.validators.keys().copied().collect()
    }
}

/// Flatten `validator` derive errors into one [`CoreError::Validation`].
///
/// Messages are `field: code` pairs sorted by field name so the output is
/// stable.
pub fn from_validation_errors(errors: ValidationErrors) -> CoreError {
    let mut parts: Vec<String> = errors
        .errors()
        .iter()
        .flat_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(errs) => errs
                .iter()
                .map(|e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: {}", e.code),
                })
                .collect::<Vec<_>>(),
            _ => vec![format!("{field}: invalid")],
        })
        .collect();
    parts.sort();
    CoreError::Validation(parts.join("; "))
}
