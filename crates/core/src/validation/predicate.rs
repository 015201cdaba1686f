//! Invocation of builtin predicates against a field value.

use std::sync::Arc;

use tracing::trace;

use crate::model::{PredicateTest, Record, TestSpec, Value};
use crate::predicates::{Builtin, Predicate};
use crate::report::ErrorItem;

/// Run one predicate registration against a non-null field value.
///
/// # Errors
///
/// Returns the error item describing the failure when the predicate rejects
/// the value.
pub fn invoke_predicate(
    value: &Value,
    test: &PredicateTest,
    field: &str,
    record: &Arc<Record>,
) -> Result<(), ErrorItem> {
    let spec = legacy_options_spec(&test.predicate, &test.spec);
    let text = value.to_text();
    let args = normalize_args(&test.predicate, &spec, field);

    if test.predicate.test(&text, &args, record) {
        return Ok(());
    }

    trace!(field, predicate = %test.name, "predicate rejected value");
    let message = spec
        .message()
        .map_or_else(|| format!("Validation {} on {} failed", test.name, field), str::to_string);

    Err(ErrorItem::function(message, field, value, record, &test.name).with_predicate(&test.name, args))
}

/// URL and email predicates take an options object rather than positional
/// arguments: a message-only specification is reduced to `{msg}` and `true`
/// to an empty object.
pub(crate) fn legacy_options_spec(predicate: &Predicate, spec: &TestSpec) -> TestSpec {
    if !predicate.builtin().is_some_and(|b| b.takes_options_object()) {
        return spec.clone();
    }
    match spec {
        TestSpec::Enabled | TestSpec::Value(Value::Bool(true)) => {
            TestSpec::Value(Value::Object(Default::default()))
        }
        TestSpec::Options { args: None, msg: Some(msg) } => TestSpec::msg(msg.clone()),
        other => other.clone(),
    }
}

/// Turn a test specification into the positional argument list.
pub(crate) fn normalize_args(predicate: &Predicate, spec: &TestSpec, field: &str) -> Vec<Value> {
    let payload = spec.payload();
    if let Value::Array(items) = payload {
        return items;
    }

    match predicate.builtin() {
        Some(b) if b.is_locale_aware() || b == Builtin::IsIp => Vec::new(),
        Some(Builtin::IsImmutable) => vec![payload, Value::from(field)],
        _ => vec![payload],
    }
}
