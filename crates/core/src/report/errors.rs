//! Error types for model building and validation runs.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::item::ErrorItem;
use crate::hooks::HookError;
use crate::model::Value;

/// Message used when a failure carries nothing readable.
pub const FALLBACK_MESSAGE: &str = "Validation error";

/// Raw failure raised by a custom validator.
#[derive(Debug, Clone)]
pub enum Failure {
    /// A plain message.
    Message(String),
    /// An error value.
    Error(Arc<dyn std::error::Error + Send + Sync>),
    /// Any other value; has no readable message.
    Opaque(Value),
}

impl Failure {
    /// Wrap an error value.
    pub fn error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Error(Arc::new(err))
    }

    /// Message carried by the failure.
    pub fn message(&self) -> String {
        match self {
            Self::Message(msg) if !msg.is_empty() => msg.clone(),
            Self::Error(err) => err.to_string(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<&str> for Failure {
    fn from(msg: &str) -> Self {
        Self::Message(msg.to_string())
    }
}

impl From<String> for Failure {
    fn from(msg: String) -> Self {
        Self::Message(msg)
    }
}

impl From<Value> for Failure {
    fn from(value: Value) -> Self {
        Self::Opaque(value)
    }
}

/// Errors raised while building a model. These are configuration errors and
/// never become part of a validation report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// Predicate name not present in the registry.
    #[error("invalid validator function: {0}")]
    UnknownPredicate(String),

    /// Validator registered for a field the model does not declare.
    #[error("model '{model}' has no field '{field}'")]
    UnknownField { model: String, field: String },

    #[error("field '{field}' declared twice in model '{model}'")]
    DuplicateField { model: String, field: String },

    #[error("validator '{name}' registered twice on '{field}'")]
    DuplicateValidator { field: String, name: String },

    /// External predicate would shadow a builtin.
    #[error("predicate '{0}' is already registered")]
    DuplicatePredicate(String),
}

/// Aggregate report of every violation found in one validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    errors: Vec<ErrorItem>,
}

impl ValidationError {
    pub fn new(errors: Vec<ErrorItem>) -> Self {
        Self { errors }
    }

    /// Items in completion order.
    pub fn errors(&self) -> &[ErrorItem] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ErrorItem> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Items recorded for a field or record-level validator.
    pub fn get(&self, path: &str) -> Vec<&ErrorItem> {
        self.errors.iter().filter(|e| e.path() == path).collect()
    }

    /// Distinct paths with at least one item, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.errors.iter().map(ErrorItem::path).collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(FALLBACK_MESSAGE)?;
        if !self.errors.is_empty() {
            let lines: Vec<String> = self.errors.iter().map(ErrorItem::to_string).collect();
            write!(f, ": {}", lines.join(",\n"))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Failure of a validation run as seen by the caller.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The record violates its constraints.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A lifecycle hook failed.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Error substituted by a `validation_failed` hook.
    #[error("{0}")]
    Substituted(Box<dyn std::error::Error + Send + Sync>),
}

impl ValidateError {
    /// The report, when the run failed on data.
    pub fn report(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid(report) => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk on fire")]
    struct Fire;

    #[test]
    fn test_failure_messages() {
        assert_eq!(Failure::from("odd").message(), "odd");
        assert_eq!(Failure::error(Fire).message(), "disk on fire");
        assert_eq!(Failure::from(Value::Int(42)).message(), FALLBACK_MESSAGE);
        assert_eq!(Failure::from("").message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_empty_report_display() {
        let report = ValidationError::new(Vec::new());
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "Validation error");
    }

    #[test]
    fn test_model_error_display() {
        let err = ModelError::UnknownPredicate("isEmial".into());
        assert_eq!(err.to_string(), "invalid validator function: isEmial");
    }

    #[test]
    fn test_substituted_error_display() {
        let err = ValidateError::Substituted(Box::new(Fire));
        assert_eq!(err.to_string(), "disk on fire");
        assert!(err.report().is_none());
    }
}
