//! Structural checks implied by a field definition.

use std::sync::Arc;

use crate::model::{FieldDefinition, FieldValidator, Record, Value};
use crate::report::{ErrorItem, ErrorKind, NOT_A_STRING_KEY, NOT_NULL_KEY};

/// Run the not-null and string-shape checks for one field.
///
/// Findings are appended to `errors`; the check itself cannot fail.
pub fn check_schema(
    def: &FieldDefinition,
    value: &Value,
    record: &Arc<Record>,
    errors: &mut Vec<ErrorItem>,
) {
    if !def.allow_null && value.is_null() && !populated_by_association(def, record) {
        let message = not_null_message(def, record);
        errors.push(ErrorItem::structural(
            ErrorKind::NotNull,
            message,
            &def.name,
            value,
            record,
            NOT_NULL_KEY,
        ));
    }

    if def.field_type.is_string_like() && holds_collection(value) {
        errors.push(ErrorItem::structural(
            ErrorKind::StringViolation,
            format!("{} cannot be an array or an object", def.name),
            &def.name,
            value,
            record,
            NOT_A_STRING_KEY,
        ));
    }
}

/// Foreign key of a to-one association whose related object is loaded.
fn populated_by_association(def: &FieldDefinition, record: &Record) -> bool {
    def.belongs_to.as_deref().is_some_and(|accessor| record.related(accessor).is_some())
}

fn not_null_message(def: &FieldDefinition, record: &Record) -> String {
    if let Some(msg) = &def.not_null_message {
        return msg.clone();
    }

    let registered = record.model().validators(&def.name).iter().find_map(|(_, v)| match v {
        FieldValidator::Predicate(test) if test.name == "notNull" => test.spec.message(),
        _ => None,
    });

    match registered {
        Some(msg) => msg.to_string(),
        None => format!("{}.{} cannot be null", record.model().name(), def.name),
    }
}

/// Arrays and objects, except binary values and raw expressions.
fn holds_collection(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}
