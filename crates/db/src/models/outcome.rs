//! Results of draft operations and of whole-survey publish and restore.

use serde::Serialize;
use surveyor_core::types::DbId;

/// Result of deleting a draft question or option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The draft was never published and has been removed.
    Purged { id: DbId },
    /// The draft stays behind, marked `DELETED` until the next publish.
    MarkedDeleted { id: DbId },
}

/// Result of restoring a draft question or option.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RestoreOutcome<T> {
    /// The draft had no published counterpart and has been removed.
    Purged { id: DbId },
    /// The draft now mirrors its published counterpart again.
    Restored { draft: T },
}

impl<T> RestoreOutcome<T> {
    pub fn is_purged(&self) -> bool {
        matches!(self, RestoreOutcome::Purged { .. })
    }
}

/// Row counts from a publish run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub questions_created: u64,
    pub questions_updated: u64,
    pub questions_deleted: u64,
    pub options_created: u64,
    pub options_updated: u64,
    pub options_deleted: u64,
}

/// Draft counts from a whole-survey restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub questions_restored: u64,
    pub questions_purged: u64,
}
