//! Record data model.
//!
//! A [`Model`] describes fields and the validators registered on them; a
//! [`Record`] holds the current values of one instance of a model.

pub mod field;
pub mod record;
pub mod registration;
pub mod value;

pub use field::{FieldDefinition, FieldType};
pub use record::{Model, ModelBuilder, Record};
pub use registration::{
    Completion, FieldCheck, FieldValidator, Outcome, PredicateTest, RecordCheck, TestSpec,
};
pub use value::{RawExpression, Value};
