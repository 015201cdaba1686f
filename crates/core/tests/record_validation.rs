use recval_core::hooks::{HookDispatcher, HookError, HookFuture};
use recval_core::model::{
    FieldCheck, FieldDefinition, FieldType, Model, Record, RecordCheck, TestSpec, Value,
};
use recval_core::predicates::PredicateRegistry;
use recval_core::report::{
    ErrorKind, Failure, ModelError, NOT_A_STRING_KEY, NOT_NULL_KEY, Origin, ValidateError,
};
use recval_core::validation::{RecordValidator, ValidateOptions, validate};
use serde_json::json;
use std::sync::Arc;

fn registry() -> PredicateRegistry {
    PredicateRegistry::with_builtins()
}

async fn report(record: Record, options: ValidateOptions) -> Vec<recval_core::report::ErrorItem> {
    match RecordValidator::new(Arc::new(record), options).run().await {
        Ok(()) => Vec::new(),
        Err(ValidateError::Invalid(report)) => report.into_errors(),
        Err(other) => panic!("expected a validation report, got {other:?}"),
    }
}

#[tokio::test]
async fn record_without_validators_passes() {
    let model = Model::builder("Note")
        .field(FieldDefinition::new("title", FieldType::String))
        .field(FieldDefinition::new("views", FieldType::Integer))
        .build(&registry())
        .unwrap();
    let record = Record::from_json(Arc::new(model), json!({ "title": "hi", "views": 3 }));

    assert!(report(record, ValidateOptions::new()).await.is_empty());
}

#[tokio::test]
async fn null_required_field_reports_is_null() {
    let model = Model::builder("Person")
        .field(FieldDefinition::new("age", FieldType::Integer).not_null())
        .build(&registry())
        .unwrap();
    let record = Record::from_json(Arc::new(model), json!({ "age": null }));

    let errors = report(record, ValidateOptions::new()).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "age");
    assert_eq!(errors[0].validator_key(), NOT_NULL_KEY);
    assert_eq!(errors[0].value(), &Value::Null);
    assert_eq!(errors[0].kind(), ErrorKind::NotNull);
    assert_eq!(errors[0].origin(), Origin::Core);
    assert_eq!(errors[0].message(), "Person.age cannot be null");
}

#[tokio::test]
async fn loaded_association_exempts_foreign_key() {
    let model = Arc::new(
        Model::builder("Post")
            .field(FieldDefinition::new("author_id", FieldType::Integer).not_null().belongs_to("author"))
            .build(&registry())
            .unwrap(),
    );

    let orphan = model.record();
    assert_eq!(report(orphan, ValidateOptions::new()).await.len(), 1);

    let with_author = model.record().with_related("author", Value::object([("id", 7)]));
    assert!(report(with_author, ValidateOptions::new()).await.is_empty());
}

#[tokio::test]
async fn collection_in_string_field_reports_not_a_string() {
    let model = Model::builder("Tag")
        .field(FieldDefinition::new("name", FieldType::String))
        .build(&registry())
        .unwrap();
    let record = Record::from_json(Arc::new(model), json!({ "name": ["a", "b"] }));

    let errors = report(record, ValidateOptions::new()).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "name");
    assert_eq!(errors[0].validator_key(), NOT_A_STRING_KEY);
    assert_eq!(errors[0].kind(), ErrorKind::StringViolation);
}

#[tokio::test]
async fn binary_and_raw_values_are_not_collections() {
    let model = Arc::new(
        Model::builder("Tag")
            .field(FieldDefinition::new("name", FieldType::String))
            .build(&registry())
            .unwrap(),
    );

    let binary = model.record().with("name", Value::Binary(b"abc".to_vec()));
    assert!(report(binary, ValidateOptions::new()).await.is_empty());

    let raw = model.record().with("name", Value::raw("LOWER('X')"));
    assert!(report(raw, ValidateOptions::new()).await.is_empty());

    let object = model.record().with("name", Value::object([("a", 1)]));
    assert_eq!(report(object, ValidateOptions::new()).await.len(), 1);
}

#[tokio::test]
async fn invalid_email_reports_is_email() {
    let model = Model::builder("User")
        .field(FieldDefinition::new("email", FieldType::String))
        .validate("email", "isEmail", TestSpec::Enabled)
        .build(&registry())
        .unwrap();
    let record = Record::from_json(Arc::new(model), json!({ "email": "not-an-email" }));

    let errors = report(record, ValidateOptions::new()).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "email");
    assert_eq!(errors[0].validator_key(), "isEmail");
    assert_eq!(errors[0].validator_name(), Some("isEmail"));
    assert_eq!(errors[0].origin(), Origin::Function);
}

#[tokio::test]
async fn auto_increment_field_runs_its_validators() {
    let model = Model::builder("User")
        .field(FieldDefinition::new("id", FieldType::Integer).not_null().auto_increment())
        .validate("id", "min", TestSpec::Value(Value::Int(10)))
        .validate_with("id", "reserved", FieldCheck::sync(|_, _| Err("nope".into())))
        .build(&registry())
        .unwrap();
    let record = Record::from_json(Arc::new(model), json!({ "id": 1 }));

    let errors = report(record, ValidateOptions::new()).await;
    let keys: Vec<_> = errors.iter().map(|e| e.validator_key()).collect();
    assert_eq!(keys, ["min", "reserved"]);
}

#[tokio::test]
async fn large_integral_float_compares_by_value() {
    let model = Model::builder("Reading")
        .field(FieldDefinition::new("x", FieldType::Float))
        .validate("x", "max", TestSpec::Value(Value::Float(1e19)))
        .build(&registry())
        .unwrap();

    let over = Arc::new(model).record().with("x", Value::Float(1e20));
    let errors = report(over, ValidateOptions::new()).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].validator_key(), "max");
}

#[tokio::test]
async fn every_failing_field_is_reported() {
    let model = Model::builder("Account")
        .field(FieldDefinition::new("handle", FieldType::String))
        .field(FieldDefinition::new("age", FieldType::Integer))
        .field(FieldDefinition::new("site", FieldType::String))
        .field(FieldDefinition::new("color", FieldType::String))
        .validate("handle", "isAlpha", TestSpec::Enabled)
        .validate("age", "min", TestSpec::Value(Value::Int(18)))
        .validate("site", "isUrl", TestSpec::Enabled)
        .validate("color", "isHexColor", TestSpec::Enabled)
        .build(&registry())
        .unwrap();
    let record = Record::from_json(
        Arc::new(model),
        json!({ "handle": "h4x", "age": 9, "site": "nope", "color": "blue" }),
    );

    let errors = report(record, ValidateOptions::new()).await;
    assert_eq!(errors.len(), 4);
    let mut paths: Vec<_> = errors.iter().map(|e| e.path()).collect();
    paths.sort_unstable();
    assert_eq!(paths, ["age", "color", "handle", "site"]);
}

#[tokio::test]
async fn throwing_record_validator_keyed_by_name() {
    let model = Model::builder("Place")
        .field(FieldDefinition::new("lat", FieldType::Float))
        .field(FieldDefinition::new("lng", FieldType::Float))
        .record_validator(
            "bothCoordsOrNone",
            RecordCheck::sync(|r| {
                if r.get("lat").is_null() != r.get("lng").is_null() {
                    Err("either both or none".into())
                } else {
                    Ok(())
                }
            }),
        )
        .build(&registry())
        .unwrap();
    let record = Record::from_json(Arc::new(model), json!({ "lat": 1.5 }));

    let errors = report(record, ValidateOptions::new()).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "bothCoordsOrNone");
    assert_eq!(errors[0].validator_key(), "bothCoordsOrNone");
    assert_eq!(errors[0].message(), "either both or none");
}

#[derive(Debug, thiserror::Error)]
#[error("username taken")]
struct Taken;

#[tokio::test]
async fn callback_field_validator_error_keyed_by_field() {
    let model = Model::builder("User")
        .field(FieldDefinition::new("username", FieldType::String))
        .validate_with(
            "username",
            "unique",
            FieldCheck::callback(|_, _, done| done.fail(Failure::error(Taken))),
        )
        .build(&registry())
        .unwrap();
    let record = Record::from_json(Arc::new(model), json!({ "username": "ann" }));

    let errors = report(record, ValidateOptions::new()).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "username");
    assert_eq!(errors[0].message(), "username taken");
    assert_eq!(errors[0].original().map(ToString::to_string).as_deref(), Some("username taken"));
}

#[tokio::test]
async fn callback_dropping_completion_is_reported() {
    let model = Model::builder("User")
        .field(FieldDefinition::new("username", FieldType::String))
        .record_validator("silent", RecordCheck::callback(|_, done| drop(done)))
        .build(&registry())
        .unwrap();

    let errors = report(model_record(model), ValidateOptions::new()).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "silent");
}

fn model_record(model: Model) -> Record {
    Arc::new(model).record()
}

#[tokio::test]
async fn skipped_fields_never_report() {
    let model = Arc::new(
        Model::builder("User")
            .field(FieldDefinition::new("name", FieldType::String).not_null())
            .field(FieldDefinition::new("email", FieldType::String).not_null())
            .validate("email", "isEmail", TestSpec::Enabled)
            .build(&registry())
            .unwrap(),
    );

    let errors = report(model.record(), ValidateOptions::new().skip(["name"])).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "email");

    let errors = report(model.record().with("email", "bad"), ValidateOptions::new().fields(["name"])).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "name");
}

#[test]
fn unknown_predicate_fails_at_build() {
    let err = Model::builder("User")
        .field(FieldDefinition::new("email", FieldType::String))
        .validate("email", "isEmial", TestSpec::Enabled)
        .build(&registry())
        .unwrap_err();
    assert_eq!(err, ModelError::UnknownPredicate("isEmial".to_string()));
}

#[tokio::test]
async fn immutable_field_rejects_change() {
    let model = Arc::new(
        Model::builder("Order")
            .field(FieldDefinition::new("code", FieldType::String))
            .validate("code", "isImmutable", TestSpec::Enabled)
            .build(&registry())
            .unwrap(),
    );

    let fresh = model.record().with("code", "A1");
    assert!(report(fresh, ValidateOptions::new()).await.is_empty());

    let unchanged = model.record().with("code", "A1").with_previous("code", "A1");
    assert!(report(unchanged, ValidateOptions::new()).await.is_empty());

    let changed = model.record().with("code", "B2").with_previous("code", "A1");
    let errors = report(changed, ValidateOptions::new()).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].validator_args(), [Value::Bool(true), Value::from("code")]);
}

#[tokio::test]
async fn external_predicate_runs() {
    let mut registry = registry();
    registry.register("isEven", |text, _, _| text.parse::<i64>().is_ok_and(|n| n % 2 == 0)).unwrap();

    let model = Arc::new(
        Model::builder("Pair")
            .field(FieldDefinition::new("n", FieldType::Integer))
            .validate("n", "isEven", TestSpec::Enabled.with_msg("n must be even"))
            .build(&registry)
            .unwrap(),
    );

    assert!(report(model.record().with("n", 4), ValidateOptions::new()).await.is_empty());
    let errors = report(model.record().with("n", 3), ValidateOptions::new()).await;
    assert_eq!(errors[0].message(), "n must be even");
}

struct Gate;

impl HookDispatcher for Gate {
    fn before_validate<'a>(&'a self, _: &'a Record, _: &'a ValidateOptions) -> HookFuture<'a, ()> {
        Box::pin(async { Err(HookError::Rejected("closed".into())) })
    }
}

#[tokio::test]
async fn before_hook_failure_prevents_checks() {
    let gate = Gate;
    let seen = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = Arc::clone(&seen);
    let model = Model::builder("User")
        .field(FieldDefinition::new("name", FieldType::String))
        .record_validator(
            "touch",
            RecordCheck::sync(move |_| {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            }),
        )
        .build(&registry())
        .unwrap();

    let err = validate(Arc::new(model_record(model)), ValidateOptions::new(), &gate).await.unwrap_err();
    assert!(matches!(err, ValidateError::Hook(HookError::Rejected(_))));
    assert!(!seen.load(std::sync::atomic::Ordering::SeqCst));
}
