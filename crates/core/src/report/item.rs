//! A single recorded violation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::errors::Failure;
use crate::model::{Record, Value};

/// Extension key under which the raw custom-validator failure is stored.
pub const ORIGINAL_ERROR: &str = "original";

/// Diagnostic key of the not-null violation.
pub const NOT_NULL_KEY: &str = "is_null";

/// Diagnostic key of the string-shape violation.
pub const NOT_A_STRING_KEY: &str = "not_a_string";

/// Category of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotNull,
    StringViolation,
    Validation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotNull => "notNull Violation",
            Self::StringViolation => "string violation",
            Self::Validation => "Validation error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a violation was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Structural check implied by the field definition.
    Core,
    /// Predicate or custom validator.
    Function,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "CORE",
            Self::Function => "FUNCTION",
        }
    }
}

/// One violation found during a validation run.
#[derive(Debug, Clone)]
pub struct ErrorItem {
    message: String,
    kind: ErrorKind,
    origin: Origin,
    path: String,
    value: Value,
    instance: Arc<Record>,
    validator_key: String,
    validator_name: Option<String>,
    validator_args: Vec<Value>,
    extensions: BTreeMap<&'static str, Failure>,
}

impl ErrorItem {
    /// Violation found by a structural check.
    pub(crate) fn structural(
        kind: ErrorKind,
        message: String,
        path: &str,
        value: &Value,
        instance: &Arc<Record>,
        key: &str,
    ) -> Self {
        Self {
            message,
            kind,
            origin: Origin::Core,
            path: path.to_string(),
            value: value.clone(),
            instance: Arc::clone(instance),
            validator_key: key.to_string(),
            validator_name: None,
            validator_args: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    /// Violation reported by a predicate or custom validator.
    pub(crate) fn function(
        message: String,
        path: &str,
        value: &Value,
        instance: &Arc<Record>,
        key: &str,
    ) -> Self {
        Self {
            message,
            kind: ErrorKind::Validation,
            origin: Origin::Function,
            path: path.to_string(),
            value: value.clone(),
            instance: Arc::clone(instance),
            validator_key: key.to_string(),
            validator_name: None,
            validator_args: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    pub(crate) fn with_predicate(mut self, name: &str, args: Vec<Value>) -> Self {
        self.validator_name = Some(name.to_string());
        self.validator_args = args;
        self
    }

    pub(crate) fn with_original(mut self, failure: Failure) -> Self {
        self.extensions.insert(ORIGINAL_ERROR, failure);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Field name, or validator name for record-level validators.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The offending value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The record that was validated.
    pub fn instance(&self) -> &Arc<Record> {
        &self.instance
    }

    /// Name of the failing validator or test.
    pub fn validator_key(&self) -> &str {
        &self.validator_key
    }

    /// Predicate name, for builtin predicate failures only.
    pub fn validator_name(&self) -> Option<&str> {
        self.validator_name.as_deref()
    }

    /// Normalized predicate arguments, for builtin predicate failures only.
    pub fn validator_args(&self) -> &[Value] {
        &self.validator_args
    }

    /// Diagnostic extension stored under `key`.
    pub fn extension(&self, key: &str) -> Option<&Failure> {
        self.extensions.get(key)
    }

    /// The raw failure of a custom validator.
    pub fn original(&self) -> Option<&Failure> {
        self.extension(ORIGINAL_ERROR)
    }
}

impl fmt::Display for ErrorItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl Serialize for ErrorItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ErrorItem", 8)?;
        s.serialize_field("message", &self.message)?;
        s.serialize_field("type", self.kind.as_str())?;
        s.serialize_field("origin", self.origin.as_str())?;
        s.serialize_field("path", &self.path)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("validatorKey", &self.validator_key)?;
        s.serialize_field("validatorName", &self.validator_name)?;
        s.serialize_field("validatorArgs", &self.validator_args)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::predicates::PredicateRegistry;

    fn instance() -> Arc<Record> {
        let model = Arc::new(Model::builder("User").build(&PredicateRegistry::new()).unwrap());
        Arc::new(model.record())
    }

    #[test]
    fn test_structural_item() {
        let item = ErrorItem::structural(
            ErrorKind::NotNull,
            "User.age cannot be null".into(),
            "age",
            &Value::Null,
            &instance(),
            NOT_NULL_KEY,
        );
        assert_eq!(item.origin(), Origin::Core);
        assert_eq!(item.validator_key(), "is_null");
        assert!(item.validator_name().is_none());
        assert_eq!(item.to_string(), "notNull Violation: User.age cannot be null");
    }

    #[test]
    fn test_function_item_diagnostics() {
        let item = ErrorItem::function("bad".into(), "age", &Value::Int(3), &instance(), "isEven")
            .with_original(Failure::from("odd"));
        assert_eq!(item.kind(), ErrorKind::Validation);
        assert_eq!(item.extension(ORIGINAL_ERROR).map(Failure::message), Some("odd".into()));

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["path"], "age");
        assert_eq!(json["validatorKey"], "isEven");
        assert_eq!(json["type"], "Validation error");
    }
}
