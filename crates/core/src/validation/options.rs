//! Options of a validation run.

use std::collections::BTreeSet;

use crate::model::Model;

/// Options recognised by a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Field and record-level validator names to leave out.
    pub skip: Option<BTreeSet<String>>,
    /// Fields to validate. Without an explicit `skip`, every other declared
    /// field is skipped.
    pub fields: Option<BTreeSet<String>>,
    /// Run lifecycle hooks around the validation.
    pub hooks: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self { skip: None, fields: None, hooks: true }
    }
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn hooks(mut self, enabled: bool) -> Self {
        self.hooks = enabled;
        self
    }

    /// The effective skip set for a model.
    pub fn resolve_skip(&self, model: &Model) -> BTreeSet<String> {
        match (&self.skip, &self.fields) {
            (Some(skip), _) => skip.clone(),
            (None, Some(fields)) => model.field_names().difference(fields).cloned().collect(),
            (None, None) => BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDefinition, FieldType};
    use crate::predicates::PredicateRegistry;

    fn model() -> Model {
        Model::builder("User")
            .field(FieldDefinition::new("name", FieldType::String))
            .field(FieldDefinition::new("email", FieldType::String))
            .field(FieldDefinition::new("age", FieldType::Integer))
            .build(&PredicateRegistry::new())
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let options = ValidateOptions::default();
        assert!(options.hooks);
        assert!(options.resolve_skip(&model()).is_empty());
    }

    #[test]
    fn test_fields_is_inverse_skip() {
        let options = ValidateOptions::new().fields(["email"]);
        let skip = options.resolve_skip(&model());
        assert_eq!(skip, BTreeSet::from(["age".to_string(), "name".to_string()]));
    }

    #[test]
    fn test_explicit_skip_wins_over_fields() {
        let options = ValidateOptions::new().fields(["email"]).skip(["age"]);
        assert_eq!(options.resolve_skip(&model()), BTreeSet::from(["age".to_string()]));
    }
}
