//! Validation of a whole record.

use std::sync::Arc;

use futures_util::future::{join, join_all};
use tracing::{debug, warn};

use super::custom::invoke_record_check;
use super::field::validate_field;
use super::options::ValidateOptions;
use crate::hooks::{HookDispatcher, NoHooks};
use crate::model::Record;
use crate::report::{ValidateError, ValidationError};

static NO_HOOKS: NoHooks = NoHooks;

/// One validation run over a record.
///
/// A validator is consumed by [`RecordValidator::run`] or
/// [`RecordValidator::validate`], so it can never run twice:
///
/// ```compile_fail
/// # use std::sync::Arc;
/// # use recval_core::model::Model;
/// # use recval_core::predicates::PredicateRegistry;
/// # use recval_core::validation::{RecordValidator, ValidateOptions};
/// # async fn twice() {
/// let model = Model::builder("User").build(&PredicateRegistry::with_builtins()).unwrap();
/// let record = Arc::new(Arc::new(model).record());
/// let validator = RecordValidator::new(record, ValidateOptions::new());
/// let _ = validator.run().await;
/// let _ = validator.run().await;
/// # }
/// ```
pub struct RecordValidator<'h> {
    record: Arc<Record>,
    options: ValidateOptions,
    hooks: &'h dyn HookDispatcher,
}

impl RecordValidator<'static> {
    pub fn new(record: Arc<Record>, options: ValidateOptions) -> Self {
        Self { record, options, hooks: &NO_HOOKS }
    }
}

impl<'h> RecordValidator<'h> {
    /// Use `hooks` when the options enable hooks.
    pub fn with_hooks<'a>(self, hooks: &'a dyn HookDispatcher) -> RecordValidator<'a> {
        RecordValidator { record: self.record, options: self.options, hooks }
    }

    pub fn record(&self) -> &Arc<Record> {
        &self.record
    }

    pub fn options(&self) -> &ValidateOptions {
        &self.options
    }

    /// Run every check and collect the violations. Hooks are not called.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Invalid`] carrying every violation when at
    /// least one check failed.
    pub async fn run(self) -> Result<(), ValidateError> {
        run_checks(&self.record, &self.options).await
    }

    /// Run the validation, wrapped in lifecycle hooks when enabled, and hand
    /// the record back on success.
    ///
    /// # Errors
    ///
    /// A failing `before_validate` or `after_validate` hook aborts with
    /// [`ValidateError::Hook`]. A failed run goes through `validation_failed`,
    /// which may replace the error.
    pub async fn validate(self) -> Result<Arc<Record>, ValidateError> {
        let Self { record, options, hooks } = self;
        if !options.hooks {
            run_checks(&record, &options).await?;
            return Ok(record);
        }

        hooks.before_validate(&record, &options).await?;
        match run_checks(&record, &options).await {
            Ok(()) => {
                hooks.after_validate(&record, &options).await?;
                Ok(record)
            }
            Err(err) => {
                let replacement = hooks.validation_failed(&record, &options, &err).await?;
                if replacement.is_some() {
                    warn!(model = record.model().name(), "validation error replaced by hook");
                }
                Err(replacement.unwrap_or(err))
            }
        }
    }
}

/// Validate `record`, calling `hooks` when the options enable them.
///
/// # Errors
///
/// See [`RecordValidator::validate`].
pub async fn validate(
    record: Arc<Record>,
    options: ValidateOptions,
    hooks: &dyn HookDispatcher,
) -> Result<Arc<Record>, ValidateError> {
    RecordValidator::new(record, options).with_hooks(hooks).validate().await
}

async fn run_checks(record: &Arc<Record>, options: &ValidateOptions) -> Result<(), ValidateError> {
    let model = record.model();
    let skip = options.resolve_skip(model);
    debug!(model = model.name(), skipped = skip.len(), "validating record");

    let fields = join_all(
        model
            .fields()
            .iter()
            .filter(|def| !skip.contains(&def.name))
            .map(|def| validate_field(def, record)),
    );
    let record_checks = join_all(
        model
            .record_validators()
            .iter()
            .filter(|(name, _)| !skip.contains(name))
            .map(|(name, check)| invoke_record_check(check, name, record)),
    );

    let (field_errors, record_errors) = join(fields, record_checks).await;
    let errors: Vec<_> = field_errors
        .into_iter()
        .flatten()
        .chain(record_errors.into_iter().filter_map(Result::err))
        .collect();

    if errors.is_empty() {
        debug!(model = model.name(), "record is valid");
        return Ok(());
    }

    debug!(model = model.name(), violations = errors.len(), "record is invalid");
    Err(ValidationError::new(errors).into())
}
