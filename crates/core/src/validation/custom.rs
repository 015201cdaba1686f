//! Invocation of user-supplied validators.

use std::sync::Arc;

use tracing::trace;

use crate::model::{Completion, FieldCheck, Outcome, Record, RecordCheck, Value};
use crate::report::{ErrorItem, Failure};

/// Message of the failure recorded when a callback validator drops its
/// completion handle without reporting.
pub const UNREPORTED: &str = "validator finished without reporting a result";

/// Run a field-scoped validator against a non-null value.
///
/// The resulting item is reported on the field and keyed by the validator
/// name.
pub async fn invoke_field_check(
    check: &FieldCheck,
    name: &str,
    value: &Value,
    field: &str,
    record: &Arc<Record>,
) -> Result<(), ErrorItem> {
    let outcome = match check {
        FieldCheck::Sync(f) => f(value, record),
        FieldCheck::Callback(f) => {
            let (completion, rx) = Completion::channel();
            f(value, record, completion);
            settle(rx.await)
        }
    };

    outcome.map_err(|failure| {
        trace!(field, validator = name, "custom validator failed");
        to_item(failure, field, value, record, name)
    })
}

/// Run a record-level validator. Failures are reported under the
/// validator's own name.
pub async fn invoke_record_check(
    check: &RecordCheck,
    name: &str,
    record: &Arc<Record>,
) -> Result<(), ErrorItem> {
    let outcome = match check {
        RecordCheck::Sync(f) => f(record),
        RecordCheck::Callback(f) => {
            let (completion, rx) = Completion::channel();
            f(record, completion);
            settle(rx.await)
        }
    };

    outcome.map_err(|failure| {
        trace!(validator = name, "record validator failed");
        to_item(failure, name, &Value::Null, record, name)
    })
}

fn settle(received: Result<Outcome, tokio::sync::oneshot::error::RecvError>) -> Outcome {
    received.unwrap_or_else(|_| Err(Failure::from(UNREPORTED)))
}

fn to_item(failure: Failure, path: &str, value: &Value, record: &Arc<Record>, key: &str) -> ErrorItem {
    ErrorItem::function(failure.message(), path, value, record, key).with_original(failure)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use super::*;
    use crate::model::{FieldDefinition, FieldType, Model};
    use crate::predicates::PredicateRegistry;
    use crate::report::{FALLBACK_MESSAGE, Origin};

    fn record() -> Arc<Record> {
        let model = Model::builder("Post")
            .field(FieldDefinition::new("title", FieldType::String))
            .build(&PredicateRegistry::with_builtins())
            .unwrap();
        Arc::new(Arc::new(model).record().with("title", "hello"))
    }

    #[tokio::test]
    async fn test_sync_field_check() {
        let record = record();
        let check = FieldCheck::sync(|value, _| match value.as_str() {
            Some("hello") => Err("no greetings".into()),
            _ => Ok(()),
        });

        let err = invoke_field_check(&check, "noGreeting", record.get("title"), "title", &record)
            .await
            .unwrap_err();
        assert_eq!(err.path(), "title");
        assert_eq!(err.validator_key(), "noGreeting");
        assert_eq!(err.message(), "no greetings");
        assert_eq!(err.origin(), Origin::Function);
        assert_eq!(err.value(), &Value::from("hello"));
        assert!(err.original().is_some());

        assert!(invoke_field_check(&check, "noGreeting", &Value::from("bye"), "title", &record)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_callback_field_check_preserves_error() {
        let record = record();
        let check = FieldCheck::callback(|_, _, done| {
            done.fail(Failure::error(io::Error::other("lookup failed")));
        });

        let err = invoke_field_check(&check, "exists", record.get("title"), "title", &record)
            .await
            .unwrap_err();
        assert_eq!(err.path(), "title");
        assert_eq!(err.message(), "lookup failed");
        assert!(matches!(err.original(), Some(Failure::Error(_))));
    }

    #[tokio::test]
    async fn test_completion_sent_later() {
        let record = record();
        let pending: Arc<Mutex<Option<Completion>>> = Arc::default();
        let slot = Arc::clone(&pending);
        let check = RecordCheck::callback(move |_, done| {
            *slot.lock().unwrap() = Some(done);
        });

        let run = invoke_record_check(&check, "later", &record);
        let finish = async {
            tokio::task::yield_now().await;
            if let Some(done) = pending.lock().unwrap().take() {
                done.done();
            }
        };
        let (outcome, ()) = tokio::join!(run, finish);
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_completion_is_failure() {
        let record = record();
        let check = RecordCheck::callback(|_, _done| {});

        let err = invoke_record_check(&check, "forgetful", &record).await.unwrap_err();
        assert_eq!(err.message(), UNREPORTED);
        assert_eq!(err.path(), "forgetful");
    }

    #[tokio::test]
    async fn test_record_check_keyed_by_name() {
        let record = record();
        let check = RecordCheck::sync(|_| Err(Failure::Opaque(Value::Int(42))));

        let err = invoke_record_check(&check, "bothCoordsOrNone", &record).await.unwrap_err();
        assert_eq!(err.path(), "bothCoordsOrNone");
        assert_eq!(err.validator_key(), "bothCoordsOrNone");
        assert_eq!(err.message(), FALLBACK_MESSAGE);
        assert_eq!(err.value(), &Value::Null);
        assert!(matches!(err.original(), Some(Failure::Opaque(Value::Int(42)))));
    }
}
