//! Domain logic for survey draft editing and publishing.
//!
//! Pure, I/O-free building blocks shared by the persistence and HTTP
//! layers: identifier types, the error taxonomy, the draft lifecycle state
//! machine, the ordering primitive, and question type rules.

pub mod error;
pub mod extra_params;
pub mod label;
pub mod lifecycle;
pub mod ordering;
pub mod question_type;
pub mod types;
