//! Published and draft answer option models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use surveyor_core::lifecycle::DraftState;
use surveyor_core::ordering::Ordered;
use surveyor_core::types::{DbId, SortOrder, Timestamp};

/// A row from the `options` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublishedOption {
    pub id: DbId,
    pub question_id: DbId,
    pub label: String,
    pub sort_order: SortOrder,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `draft_options` table. `question_id` is the parent draft
/// question, `original_id` the published option it mirrors.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DraftOption {
    pub id: DbId,
    pub original_id: Option<DbId>,
    pub question_id: DbId,
    pub label: String,
    pub sort_order: SortOrder,
    #[sqlx(try_from = "String")]
    pub state: DraftState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ordered for DraftOption {
    fn order(&self) -> SortOrder {
        self.sort_order
    }

    fn state(&self) -> DraftState {
        self.state
    }
}

/// DTO for adding an option. The default label is used when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDraftOption {
    pub label: Option<String>,
}
