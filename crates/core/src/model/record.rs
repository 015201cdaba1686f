//! Models (field definitions plus validator registrations) and records.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::field::FieldDefinition;
use super::registration::{FieldCheck, FieldValidator, PredicateTest, RecordCheck, TestSpec};
use super::value::Value;
use crate::predicates::PredicateRegistry;
use crate::report::ModelError;

static NULL: Value = Value::Null;

/// Validator awaiting predicate resolution.
#[derive(Debug, Clone)]
enum Pending {
    Predicate(TestSpec),
    Custom(FieldCheck),
}

/// Declarative description of a record's fields and constraints.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    fields: Vec<FieldDefinition>,
    validators: BTreeMap<String, Vec<(String, FieldValidator)>>,
    record_validators: Vec<(String, RecordCheck)>,
}

impl Model {
    /// Start building a model.
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field definitions in declaration order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of all declared fields.
    pub fn field_names(&self) -> BTreeSet<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Validators registered on a field, in registration order.
    pub fn validators(&self, field: &str) -> &[(String, FieldValidator)] {
        self.validators.get(field).map_or(&[], Vec::as_slice)
    }

    /// Record-level validators, in registration order.
    pub fn record_validators(&self) -> &[(String, RecordCheck)] {
        &self.record_validators
    }

    /// Create an empty record of this model.
    pub fn record(self: &Arc<Self>) -> Record {
        Record::new(Arc::clone(self))
    }
}

/// Builder for [`Model`].
#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    fields: Vec<FieldDefinition>,
    validators: Vec<(String, String, Pending)>,
    record_validators: Vec<(String, RecordCheck)>,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            validators: Vec::new(),
            record_validators: Vec::new(),
        }
    }

    /// Declare a field.
    pub fn field(mut self, def: FieldDefinition) -> Self {
        self.fields.push(def);
        self
    }

    /// Register a builtin predicate on a field.
    pub fn validate(
        mut self,
        field: impl Into<String>,
        predicate: impl Into<String>,
        spec: TestSpec,
    ) -> Self {
        self.validators.push((field.into(), predicate.into(), Pending::Predicate(spec)));
        self
    }

    /// Register a custom validator on a field.
    pub fn validate_with(
        mut self,
        field: impl Into<String>,
        name: impl Into<String>,
        check: FieldCheck,
    ) -> Self {
        self.validators.push((field.into(), name.into(), Pending::Custom(check)));
        self
    }

    /// Register a record-level validator.
    pub fn record_validator(mut self, name: impl Into<String>, check: RecordCheck) -> Self {
        self.record_validators.push((name.into(), check));
        self
    }

    /// Resolve predicate names and check the registrations.
    ///
    /// # Errors
    ///
    /// Fails on unknown predicate names, validators for undeclared fields and
    /// duplicate names.
    pub fn build(self, registry: &PredicateRegistry) -> Result<Model, ModelError> {
        let mut seen = BTreeSet::new();
        for def in &self.fields {
            if !seen.insert(def.name.as_str()) {
                return Err(ModelError::DuplicateField {
                    model: self.name.clone(),
                    field: def.name.clone(),
                });
            }
        }

        let mut validators: BTreeMap<String, Vec<(String, FieldValidator)>> = BTreeMap::new();
        for (field, name, pending) in self.validators {
            if !seen.contains(field.as_str()) {
                return Err(ModelError::UnknownField { model: self.name.clone(), field });
            }

            let entry = validators.entry(field.clone()).or_default();
            if entry.iter().any(|(n, _)| *n == name) {
                return Err(ModelError::DuplicateValidator { field, name });
            }

            let validator = match pending {
                Pending::Custom(check) => FieldValidator::Custom(check),
                Pending::Predicate(spec) => {
                    let predicate = registry
                        .resolve(&name)
                        .ok_or_else(|| ModelError::UnknownPredicate(name.clone()))?;
                    FieldValidator::Predicate(PredicateTest { name: name.clone(), spec, predicate })
                }
            };
            entry.push((name, validator));
        }

        let mut names = BTreeSet::new();
        for (name, _) in &self.record_validators {
            if !names.insert(name.as_str()) {
                return Err(ModelError::DuplicateValidator {
                    field: self.name.clone(),
                    name: name.clone(),
                });
            }
        }

        Ok(Model {
            name: self.name,
            fields: self.fields,
            validators,
            record_validators: self.record_validators,
        })
    }
}

/// A record instance: current values of a model's fields.
#[derive(Debug, Clone)]
pub struct Record {
    model: Arc<Model>,
    values: BTreeMap<String, Value>,
    previous: BTreeMap<String, Value>,
    related: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(model: Arc<Model>) -> Self {
        Self {
            model,
            values: BTreeMap::new(),
            previous: BTreeMap::new(),
            related: BTreeMap::new(),
        }
    }

    /// Build a record from a JSON object; non-object input yields an empty record.
    pub fn from_json(model: Arc<Model>, json: serde_json::Value) -> Self {
        let mut record = Self::new(model);
        if let serde_json::Value::Object(map) = json {
            for (k, v) in map {
                record.values.insert(k, Value::from(v));
            }
        }
        record
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Set a field's current value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Set the persisted value a field had before the current changes.
    pub fn with_previous(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.previous.insert(field.into(), value.into());
        self
    }

    /// Attach a loaded related object under an association accessor.
    pub fn with_related(mut self, accessor: impl Into<String>, value: impl Into<Value>) -> Self {
        self.related.insert(accessor.into(), value.into());
        self
    }

    /// Current value of a field; absent fields read as null.
    pub fn get(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&NULL)
    }

    /// Previous value of a field; absent fields read as null.
    pub fn previous(&self, field: &str) -> &Value {
        self.previous.get(field).unwrap_or(&NULL)
    }

    /// Loaded related object for an association, if any.
    pub fn related(&self, accessor: &str) -> Option<&Value> {
        self.related.get(accessor).filter(|v| !v.is_null())
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}
