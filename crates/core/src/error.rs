use crate::types::{DbId, SortOrder};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Order {requested} is out of range (must be between 1 and {max})")]
    OrderOutOfRange { requested: SortOrder, max: SortOrder },

    #[error("{entity} {id} does not belong to parent {parent_id}")]
    InvalidParent {
        entity: &'static str,
        id: DbId,
        parent_id: DbId,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
