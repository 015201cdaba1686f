//! Registry of named predicates.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::builtin::Builtin;
use crate::model::{Record, Value};
use crate::report::ModelError;

/// Signature of an externally supplied predicate.
pub type PredicateFn = dyn Fn(&str, &[Value], &Record) -> bool + Send + Sync;

/// What a resolved predicate runs.
#[derive(Clone)]
pub enum PredicateKind {
    Builtin(Builtin),
    /// Predicate registered by the embedding application.
    External(Arc<PredicateFn>),
}

impl fmt::Debug for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(b) => f.debug_tuple("Builtin").field(b).finish(),
            Self::External(_) => f.write_str("External"),
        }
    }
}

/// A predicate resolved by name.
#[derive(Debug, Clone)]
pub struct Predicate {
    name: String,
    kind: PredicateKind,
}

impl Predicate {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &PredicateKind {
        &self.kind
    }

    /// The builtin this predicate runs, if any.
    pub fn builtin(&self) -> Option<Builtin> {
        match self.kind {
            PredicateKind::Builtin(b) => Some(b),
            PredicateKind::External(_) => None,
        }
    }

    /// Run the predicate against the textual value.
    pub fn test(&self, text: &str, args: &[Value], record: &Record) -> bool {
        match &self.kind {
            PredicateKind::Builtin(b) => b.check(text, args, record),
            PredicateKind::External(f) => f(text, args, record),
        }
    }
}

/// Lookup table from predicate name to implementation.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    builtins: bool,
    external: BTreeMap<String, Arc<PredicateFn>>,
}

impl PredicateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every builtin predicate.
    pub fn with_builtins() -> Self {
        Self { builtins: true, external: BTreeMap::new() }
    }

    /// Register an external predicate.
    ///
    /// # Errors
    ///
    /// Fails if the name is already taken, by a builtin or another external.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> Result<(), ModelError>
    where
        F: Fn(&str, &[Value], &Record) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        if self.resolve(&name).is_some() {
            return Err(ModelError::DuplicatePredicate(name));
        }
        self.external.insert(name, Arc::new(f));
        Ok(())
    }

    /// Resolve a predicate name.
    pub fn resolve(&self, name: &str) -> Option<Predicate> {
        if self.builtins
            && let Some(builtin) = Builtin::from_name(name)
        {
            return Some(Predicate { name: name.to_string(), kind: PredicateKind::Builtin(builtin) });
        }

        self.external.get(name).map(|f| Predicate {
            name: name.to_string(),
            kind: PredicateKind::External(Arc::clone(f)),
        })
    }

    /// All resolvable names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.external.keys().cloned().collect();
        if self.builtins {
            names.extend(Builtin::ALL.iter().map(|b| b.name().to_string()));
        }
        names.sort();
        names
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("builtins", &self.builtins)
            .field("external", &self.external.keys().collect::<Vec<_>>())
            .finish()
    }
}
