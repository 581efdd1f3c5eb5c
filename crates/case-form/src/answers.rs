use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::fields::{Field, ValidationScope};

/// Field identifiers that can key an [`ErrorSet`].
pub trait FieldKey: Copy + Ord {
    fn path(self) -> &'static str;
}

/// Validation error metadata reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub message: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Per-field errors; at most one error per field, first one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorSet<F: Ord> {
    errors: BTreeMap<F, ValidationError>,
}

impl<F: Ord> Default for ErrorSet<F> {
    fn default() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }
}

impl<F: FieldKey> ErrorSet<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: F, error: ValidationError) {
        self.errors.entry(field).or_insert(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, field: F) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn get(&self, field: F) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    pub fn message(&self, field: F) -> Option<&str> {
        self.get(field).map(|error| error.message.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &ValidationError)> + '_ {
        self.errors.iter().map(|(field, error)| (*field, error))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(F) -> bool) {
        self.errors.retain(|field, _| keep(*field));
    }
}

impl ErrorSet<Field> {
    /// Copy restricted to the fields of `scope`.
    pub fn scoped(&self, scope: ValidationScope) -> Self {
        let mut scoped = self.clone();
        scoped.retain(|field| scope.includes(field));
        scoped
    }
}

impl<F: FieldKey> fmt::Display for ErrorSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.path(), error.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Errors of a case submission, keyed by field path.
pub type ValidationErrorSet = ErrorSet<Field>;
