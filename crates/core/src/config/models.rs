//! Building models from their declarations.

use serde_json::{Map, Value as Json};

use super::loader::ConfigError;
use super::types::{FieldDecl, ModelDecl, ResolvedConfig};
use crate::model::{FieldDefinition, FieldType, Model, TestSpec, Value};
use crate::predicates::PredicateRegistry;

impl ResolvedConfig {
    /// Build the declared model `name`, resolving predicates in `registry`.
    ///
    /// # Errors
    ///
    /// Fails when no such model is declared, when a declaration is malformed
    /// or when the model itself is invalid (for example an unknown predicate).
    pub fn build_model(&self, name: &str, registry: &PredicateRegistry) -> Result<Model, ConfigError> {
        let decl = self.models.get(name).ok_or_else(|| ConfigError::ModelNotFound(name.to_string()))?;
        build_model(name, decl, registry)
    }
}

pub(crate) fn build_model(
    name: &str,
    decl: &ModelDecl,
    registry: &PredicateRegistry,
) -> Result<Model, ConfigError> {
    let mut builder = Model::builder(name);

    for (field, fd) in decl.fields.iter() {
        builder = builder.field(field_definition(name, field, fd)?);
        for (predicate, raw) in fd.validate.iter() {
            if let Some(spec) = test_spec(raw).map_err(|reason| invalid(name, field, reason))? {
                builder = builder.validate(field, predicate, spec);
            }
        }
    }

    Ok(builder.build(registry)?)
}

fn field_definition(model: &str, field: &str, fd: &FieldDecl) -> Result<FieldDefinition, ConfigError> {
    let field_type: FieldType = fd.field_type.parse().map_err(|e: String| invalid(model, field, e))?;

    let mut def = FieldDefinition::new(field, field_type);
    def.allow_null = fd.allow_null;
    def.not_null_message = fd.not_null_message.clone();
    def.auto_generated = fd.auto_generated;
    def.auto_increment = fd.auto_increment;
    def.belongs_to = fd.belongs_to.clone();
    Ok(def)
}

/// Map a declared test specification. `false` disables the predicate.
fn test_spec(raw: &Json) -> Result<Option<TestSpec>, String> {
    match raw {
        Json::Bool(false) => Ok(None),
        Json::Bool(true) => Ok(Some(TestSpec::Enabled)),
        Json::Object(map) if is_options(map) => {
            let msg = match map.get("msg") {
                None => None,
                Some(Json::String(msg)) => Some(msg.clone()),
                Some(other) => return Err(format!("msg must be a string, got {other}")),
            };
            let args = map.get("args").cloned().map(Value::from);
            Ok(Some(TestSpec::Options { args, msg }))
        }
        other => Ok(Some(TestSpec::Value(Value::from(other.clone())))),
    }
}

fn is_options(map: &Map<String, Json>) -> bool {
    !map.is_empty() && map.keys().all(|k| k == "args" || k == "msg")
}

fn invalid(model: &str, field: &str, reason: String) -> ConfigError {
    ConfigError::InvalidSpec { model: model.to_string(), field: field.to_string(), reason }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::types::LoggingConfig;
    use crate::report::ModelError;

    fn decl(fields: Json) -> ModelDecl {
        serde_json::from_value(json!({ "fields": fields })).unwrap()
    }

    #[test]
    fn test_spec_mapping() {
        assert_eq!(test_spec(&json!(false)).unwrap(), None);
        assert_eq!(test_spec(&json!(true)).unwrap(), Some(TestSpec::Enabled));
        assert_eq!(
            test_spec(&json!({"args": [3, 64], "msg": "length"})).unwrap(),
            Some(TestSpec::Options { args: Some(Value::from(vec![3, 64])), msg: Some("length".into()) })
        );
        assert_eq!(
            test_spec(&json!({"allow_display_name": true})).unwrap(),
            Some(TestSpec::Value(Value::object([("allow_display_name", true)])))
        );
        assert_eq!(test_spec(&json!(10)).unwrap(), Some(TestSpec::Value(Value::Int(10))));
        assert!(test_spec(&json!({"msg": 3})).is_err());
    }

    #[test]
    fn test_build_declared_model() {
        let decl = decl(json!({
            "email": { "type": "varchar", "allow_null": false, "validate": { "isEmail": true, "notIn": false } },
            "id": { "type": "int", "auto_increment": true },
        }));
        let model = build_model("User", &decl, &PredicateRegistry::with_builtins()).unwrap();

        let email = model.field("email").unwrap();
        assert_eq!(email.field_type, FieldType::String);
        assert!(!email.allow_null);
        assert_eq!(model.validators("email").len(), 1);
        assert!(model.field("id").unwrap().auto_increment);
    }

    #[test]
    fn test_unknown_predicate_is_model_error() {
        let decl = decl(json!({ "email": { "validate": { "isEmial": true } } }));
        let err = build_model("User", &decl, &PredicateRegistry::with_builtins()).unwrap_err();
        assert!(matches!(err, ConfigError::Model(ModelError::UnknownPredicate(ref n)) if n == "isEmial"));
    }

    #[test]
    fn test_bad_field_type() {
        let decl = decl(json!({ "email": { "type": "hologram" } }));
        let err = build_model("User", &decl, &PredicateRegistry::with_builtins()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSpec { ref field, .. } if field == "email"));
    }

    #[test]
    fn test_missing_model() {
        let cfg = ResolvedConfig {
            config_path: "config.toml".into(),
            models_dir: None,
            logging: LoggingConfig::default(),
            models: Default::default(),
        };
        let err = cfg.build_model("Ghost", &PredicateRegistry::with_builtins()).unwrap_err();
        assert!(matches!(err, ConfigError::ModelNotFound(_)));
    }
}
