pub mod doctor;
pub mod output;
pub mod predicates;
pub mod validate;
