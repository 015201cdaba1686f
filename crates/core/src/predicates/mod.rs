//! Named predicates used by builtin field validators.
//!
//! Predicates operate on the textual form of a value. Names are resolved
//! when a model is built, so an unknown name is a configuration error and
//! never reaches a validation run.

pub mod builtin;
pub mod registry;

pub use builtin::Builtin;
pub use registry::{Predicate, PredicateFn, PredicateKind, PredicateRegistry};
