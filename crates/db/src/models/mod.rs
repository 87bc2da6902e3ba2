//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` entity structs matching the database rows
//! - `Deserialize` DTOs for request bodies
//! - composed read models returned by the editor and published views

pub mod option;
pub mod outcome;
pub mod question;
pub mod survey;
