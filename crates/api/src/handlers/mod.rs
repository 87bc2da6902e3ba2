//! Request handlers.
//!
//! Each submodule provides async handler functions for one level of the
//! survey tree. Handlers delegate to the corresponding repository in
//! `surveyor_db` and map errors via [`AppError`](crate::error::AppError).

pub mod option;
pub mod question;
pub mod survey;

use surveyor_core::error::CoreError;
use surveyor_core::types::DbId;
use surveyor_db::repositories::QuestionDraftRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Reject a question id that does not belong to the survey in the path.
async fn ensure_question_in_survey(
    state: &AppState,
    survey_id: DbId,
    question_id: DbId,
) -> AppResult<()> {
    QuestionDraftRepo::find_in_survey(&state.pool, survey_id, question_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DraftQuestion",
            id: question_id,
        }))?;
    Ok(())
}
