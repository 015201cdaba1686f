use futures_util::future;
use tracing::{info, warn};

use super::{HookDispatcher, HookFuture};
use crate::model::Record;
use crate::report::ValidateError;
use crate::validation::ValidateOptions;

/// Dispatcher that records each hook as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHooks;

impl HookDispatcher for TracingHooks {
    fn before_validate<'a>(
        &'a self,
        record: &'a Record,
        options: &'a ValidateOptions,
    ) -> HookFuture<'a, ()> {
        info!(model = record.model().name(), skip = ?options.skip, "validating record");
        Box::pin(future::ready(Ok(())))
    }

    fn after_validate<'a>(
        &'a self,
        record: &'a Record,
        _options: &'a ValidateOptions,
    ) -> HookFuture<'a, ()> {
        info!(model = record.model().name(), "record is valid");
        Box::pin(future::ready(Ok(())))
    }

    fn validation_failed<'a>(
        &'a self,
        record: &'a Record,
        _options: &'a ValidateOptions,
        error: &'a ValidateError,
    ) -> HookFuture<'a, Option<ValidateError>> {
        let count = error.report().map_or(0, |r| r.len());
        warn!(model = record.model().name(), violations = count, "record is invalid");
        Box::pin(future::ready(Ok(None)))
    }
}
