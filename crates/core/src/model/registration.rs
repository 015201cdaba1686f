//! Validator registrations attached to a model.

use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;

use super::record::Record;
use super::value::Value;
use crate::predicates::Predicate;
use crate::report::Failure;

/// Test specification of a builtin predicate registration.
#[derive(Debug, Clone, PartialEq)]
pub enum TestSpec {
    /// Enable a predicate that needs no arguments.
    Enabled,
    /// A single argument, or an `Array` of positional arguments.
    Value(Value),
    /// Explicit arguments and/or a message override.
    Options { args: Option<Value>, msg: Option<String> },
}

impl TestSpec {
    /// Explicit arguments with an optional message.
    pub fn args(args: impl Into<Value>) -> Self {
        Self::Options { args: Some(args.into()), msg: None }
    }

    /// Message override without arguments.
    pub fn msg(msg: impl Into<String>) -> Self {
        Self::Options { args: None, msg: Some(msg.into()) }
    }

    /// Attach a message override, keeping any arguments.
    pub fn with_msg(self, msg: impl Into<String>) -> Self {
        let msg = Some(msg.into());
        match self {
            Self::Enabled => Self::Options { args: None, msg },
            Self::Value(v) => Self::Options { args: Some(v), msg },
            Self::Options { args, .. } => Self::Options { args, msg },
        }
    }

    /// The custom failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Options { msg, .. } => msg.as_deref(),
            _ => None,
        }
    }

    /// The raw argument payload before normalization.
    ///
    /// An explicit `args` member wins; otherwise the whole test spec is
    /// the payload, with an options object rendered as `{msg}`.
    pub fn payload(&self) -> Value {
        match self {
            Self::Enabled => Value::Bool(true),
            Self::Value(v) => v.clone(),
            Self::Options { args: Some(args), .. } => args.clone(),
            Self::Options { args: None, msg } => {
                Value::object(msg.iter().map(|m| ("msg", Value::from(m.as_str()))))
            }
        }
    }
}

impl From<Value> for TestSpec {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(true) => Self::Enabled,
            other => Self::Value(other),
        }
    }
}

/// Failure reported through a [`Completion`].
pub type Outcome = Result<(), Failure>;

/// Single-shot completion handle passed to callback-style validators.
///
/// Exactly one of [`Completion::done`], [`Completion::fail`] or
/// [`Completion::finish`] may be called; dropping the handle without calling
/// any of them counts as a failure.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<Outcome>,
}

impl Completion {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Report success.
    pub fn done(self) {
        self.finish(Ok(()));
    }

    /// Report a failure.
    pub fn fail(self, failure: impl Into<Failure>) {
        self.finish(Err(failure.into()));
    }

    /// Report an outcome.
    pub fn finish(self, outcome: Outcome) {
        // The receiver only disappears if the run itself was dropped.
        let _ = self.tx.send(outcome);
    }
}

type FieldSyncFn = dyn Fn(&Value, &Record) -> Outcome + Send + Sync;
type FieldCallbackFn = dyn Fn(&Value, &Record, Completion) + Send + Sync;
type RecordSyncFn = dyn Fn(&Record) -> Outcome + Send + Sync;
type RecordCallbackFn = dyn Fn(&Record, Completion) + Send + Sync;

/// User-supplied validator scoped to one field.
#[derive(Clone)]
pub enum FieldCheck {
    /// Called with the field value; the returned result is the outcome.
    Sync(Arc<FieldSyncFn>),
    /// Called with the field value and a completion handle.
    Callback(Arc<FieldCallbackFn>),
}

impl FieldCheck {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Value, &Record) -> Outcome + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&Value, &Record, Completion) + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }
}

impl fmt::Debug for FieldCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("FieldCheck::Sync"),
            Self::Callback(_) => f.write_str("FieldCheck::Callback"),
        }
    }
}

/// User-supplied validator over the whole record.
#[derive(Clone)]
pub enum RecordCheck {
    Sync(Arc<RecordSyncFn>),
    Callback(Arc<RecordCallbackFn>),
}

impl RecordCheck {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Record) -> Outcome + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&Record, Completion) + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }
}

impl fmt::Debug for RecordCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("RecordCheck::Sync"),
            Self::Callback(_) => f.write_str("RecordCheck::Callback"),
        }
    }
}

/// A builtin predicate registration, resolved against the registry.
#[derive(Debug, Clone)]
pub struct PredicateTest {
    pub name: String,
    pub spec: TestSpec,
    pub predicate: Predicate,
}

/// A validator registered on a field.
#[derive(Debug, Clone)]
pub enum FieldValidator {
    Predicate(PredicateTest),
    Custom(FieldCheck),
}
