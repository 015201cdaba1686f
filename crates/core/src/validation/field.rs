//! Validation of a single field.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, join_all};

use super::custom::invoke_field_check;
use super::predicate::invoke_predicate;
use super::schema::check_schema;
use crate::model::{FieldDefinition, FieldValidator, Record};
use crate::predicates::Builtin;
use crate::report::ErrorItem;

/// Validate one field and return every violation found.
///
/// Structural checks run first, except on auto-generated fields. Registered
/// validators only see non-null values; they all run to completion even when
/// some of them fail.
pub async fn validate_field(def: &FieldDefinition, record: &Arc<Record>) -> Vec<ErrorItem> {
    let mut errors = Vec::new();
    let value = record.get(&def.name);
    if !def.skips_schema_checks() {
        check_schema(def, value, record, &mut errors);
    }
    if value.is_null() {
        return errors;
    }

    let field = def.name.as_str();
    let checks: Vec<LocalBoxFuture<'_, Result<(), ErrorItem>>> = record
        .model()
        .validators(field)
        .iter()
        .filter_map(|(name, validator)| match validator {
            // Handled by the schema check.
            FieldValidator::Predicate(test) if test.predicate.builtin() == Some(Builtin::NotNull) => {
                None
            }
            FieldValidator::Predicate(test) => {
                Some(async move { invoke_predicate(value, test, field, record) }.boxed_local())
            }
            FieldValidator::Custom(check) => {
                Some(invoke_field_check(check, name, value, field, record).boxed_local())
            }
        })
        .collect();

    errors.extend(join_all(checks).await.into_iter().filter_map(Result::err));
    errors
}
