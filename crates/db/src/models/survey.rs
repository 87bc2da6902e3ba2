//! Survey entity models, DTOs, and tree views.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use surveyor_core::lifecycle::SurveyState;
use surveyor_core::types::{DbId, Timestamp};

use crate::models::option::{DraftOption, PublishedOption};
use crate::models::question::{DraftQuestion, PublishedQuestion};

/// A row from the `surveys` table: the published survey.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Survey {
    pub id: DbId,
    pub title: String,
    #[sqlx(try_from = "String")]
    pub state: SurveyState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `survey_drafts` table: the editable survey title.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SurveyDraft {
    pub survey_id: DbId,
    pub title: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a survey. A dated default title is used when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSurvey {
    pub title: Option<String>,
}

/// DTO for renaming the draft survey.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSurveyTitle {
    pub title: String,
}

/// A draft question together with all of its option drafts.
#[derive(Debug, Clone, Serialize)]
pub struct DraftQuestionTree {
    #[serde(flatten)]
    pub question: DraftQuestion,
    pub options: Vec<DraftOption>,
}

/// Everything the editor needs to render a survey, deleted drafts included.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyEditorView {
    pub survey: Survey,
    pub draft_title: String,
    pub questions: Vec<DraftQuestionTree>,
}

/// A published question together with its published options.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedQuestionTree {
    #[serde(flatten)]
    pub question: PublishedQuestion,
    pub options: Vec<PublishedOption>,
}

/// The survey as respondents see it.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedSurveyView {
    pub survey: Survey,
    pub questions: Vec<PublishedQuestionTree>,
}
