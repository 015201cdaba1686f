//! Validation reports and error types.

pub mod errors;
pub mod item;

pub use errors::{FALLBACK_MESSAGE, Failure, ModelError, ValidateError, ValidationError};
pub use item::{ErrorItem, ErrorKind, NOT_A_STRING_KEY, NOT_NULL_KEY, ORIGINAL_ERROR, Origin};
