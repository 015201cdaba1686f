//! Lifecycle hooks run around a validation.
//!
//! A [`HookDispatcher`] receives `before_validate`, `after_validate` and
//! `validation_failed` calls when hooks are enabled for a run. Each method
//! returns a boxed future so dispatchers may suspend; the default
//! implementations succeed immediately.

mod tracing_hooks;

use futures_util::future::{self, LocalBoxFuture};
use thiserror::Error;

use crate::model::Record;
use crate::report::ValidateError;
use crate::validation::ValidateOptions;

pub use tracing_hooks::TracingHooks;

/// Errors raised by lifecycle hooks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HookError {
    /// The hook refused to let the operation continue.
    #[error("hook rejected: {0}")]
    Rejected(String),

    /// The hook itself failed.
    #[error("hook execution failed: {0}")]
    Execution(String),
}

/// Future returned by hook methods.
pub type HookFuture<'a, T> = LocalBoxFuture<'a, Result<T, HookError>>;

/// Dispatcher for validation lifecycle hooks.
pub trait HookDispatcher {
    /// Runs before any check. A failure aborts the validation.
    fn before_validate<'a>(
        &'a self,
        _record: &'a Record,
        _options: &'a ValidateOptions,
    ) -> HookFuture<'a, ()> {
        Box::pin(future::ready(Ok(())))
    }

    /// Runs after a successful validation.
    fn after_validate<'a>(
        &'a self,
        _record: &'a Record,
        _options: &'a ValidateOptions,
    ) -> HookFuture<'a, ()> {
        Box::pin(future::ready(Ok(())))
    }

    /// Runs after a failed validation. Resolving to `Some(error)` replaces
    /// the original error.
    fn validation_failed<'a>(
        &'a self,
        _record: &'a Record,
        _options: &'a ValidateOptions,
        _error: &'a ValidateError,
    ) -> HookFuture<'a, Option<ValidateError>> {
        Box::pin(future::ready(Ok(None)))
    }
}

/// Dispatcher with no hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl HookDispatcher for NoHooks {}
