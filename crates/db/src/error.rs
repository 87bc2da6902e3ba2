//! Error type returned by repository operations that enforce domain rules.

use surveyor_core::error::CoreError;

/// Failure of a draft, publish, or restore operation.
///
/// Domain rejections surface as [`StoreError::Core`]; anything raised by the
/// database driver (including a failed commit) is [`StoreError::Transaction`].
/// Either way the surrounding transaction has been rolled back.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Transaction failed: {0}")]
    Transaction(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: surveyor_core::types::DbId) -> Self {
        StoreError::Core(CoreError::NotFound { entity, id })
    }
}
