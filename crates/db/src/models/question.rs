//! Published and draft question models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use surveyor_core::lifecycle::DraftState;
use surveyor_core::ordering::Ordered;
use surveyor_core::question_type::QuestionType;
use surveyor_core::types::{DbId, SortOrder, Timestamp};

/// A row from the `questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublishedQuestion {
    pub id: DbId,
    pub survey_id: DbId,
    pub label: String,
    #[sqlx(try_from = "String")]
    pub question_type: QuestionType,
    pub sort_order: SortOrder,
    pub extra_params: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `draft_questions` table.
///
/// `original_id` links the draft to its published question; it is `None`
/// only while the draft is [`DraftState::New`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DraftQuestion {
    pub id: DbId,
    pub original_id: Option<DbId>,
    pub survey_id: DbId,
    pub label: String,
    #[sqlx(try_from = "String")]
    pub question_type: QuestionType,
    pub sort_order: SortOrder,
    pub extra_params: serde_json::Value,
    #[sqlx(try_from = "String")]
    pub state: DraftState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ordered for DraftQuestion {
    fn order(&self) -> SortOrder {
        self.sort_order
    }

    fn state(&self) -> DraftState {
        self.state
    }
}

/// DTO for adding a question to the draft. `question_type` is parsed with
/// [`QuestionType::from_str`](std::str::FromStr) so unknown names surface as
/// validation errors.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDraftQuestion {
    pub question_type: String,
}

/// DTO for renaming a draft question or option.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLabel {
    pub label: String,
}

/// DTO for changing a draft question's type.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuestionType {
    pub question_type: String,
}

/// DTO for moving a draft question or option.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrder {
    pub new_order: SortOrder,
}

/// DTO for patching a draft question's extra params.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateExtraParams {
    pub extra_params: serde_json::Value,
}
