//! Validation runs.
//!
//! A [`RecordValidator`] checks every non-skipped field of a record and runs
//! its record-level validators. Checks never short-circuit: a failed run
//! reports every violation at once.

pub mod custom;
pub mod field;
pub mod options;
pub mod orchestrator;
pub mod predicate;
pub mod schema;

pub use custom::{UNREPORTED, invoke_field_check, invoke_record_check};
pub use field::validate_field;
pub use options::ValidateOptions;
pub use orchestrator::{RecordValidator, validate};
pub use predicate::invoke_predicate;
pub use schema::check_schema;
