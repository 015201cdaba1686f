#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc, clippy::must_use_candidate)]

//! Record validation engine.
//!
//! A [`model::Model`] declares fields and the validators registered on them.
//! [`validation::RecordValidator`] checks a [`model::Record`] against its
//! model, runs every check to completion and reports all violations in one
//! [`report::ValidationError`].

pub mod config;
pub mod hooks;
pub mod model;
pub mod predicates;
pub mod report;
pub mod validation;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
