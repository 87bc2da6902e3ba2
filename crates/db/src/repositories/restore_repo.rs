//! Whole-survey restore: discard every draft edit since the last publish.

use sqlx::PgPool;
use surveyor_core::types::DbId;

use crate::error::StoreError;
use crate::models::outcome::{RestoreOutcome, RestoreReport};
use crate::repositories::QuestionDraftRepo;

/// Restores all draft questions of a survey to their published state.
pub struct RestoreRepo;

impl RestoreRepo {
    /// Reset the draft title and every draft question of `survey_id`.
    ///
    /// The title is restored first, then never-published drafts are purged,
    /// then linked drafts are restored one by one in ascending published
    /// order so each lands exactly on its published position. Each question
    /// is restored in its own transaction. A failure does not stop the run;
    /// the remaining questions are still attempted and the first error is
    /// returned. Questions restored before a failure stay restored.
    pub async fn restore_survey(pool: &PgPool, survey_id: DbId) -> Result<RestoreReport, StoreError> {
        let title = sqlx::query(
            "UPDATE survey_drafts d SET title = s.title \
             FROM surveys s \
             WHERE d.survey_id = s.id AND s.id = $1",
        )
        .bind(survey_id)
        .execute(pool)
        .await?;
        if title.rows_affected() == 0 {
            return Err(StoreError::not_found("Survey", survey_id));
        }

        let drafts = sqlx::query_scalar::<_, DbId>(
            "SELECT d.id FROM draft_questions d \
             LEFT JOIN questions q ON q.id = d.original_id \
             WHERE d.survey_id = $1 \
             ORDER BY (d.original_id IS NOT NULL), q.sort_order, d.id",
        )
        .bind(survey_id)
        .fetch_all(pool)
        .await?;

        let mut report = RestoreReport::default();
        let mut first_error: Option<StoreError> = None;

        for id in drafts {
            match QuestionDraftRepo::restore(pool, id).await {
                Ok(RestoreOutcome::Purged { .. }) => report.questions_purged += 1,
                Ok(RestoreOutcome::Restored { .. }) => report.questions_restored += 1,
                Err(e) => {
                    tracing::warn!(
                        survey_id,
                        draft_id = id,
                        error = %e,
                        "Failed to restore draft question"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        tracing::info!(survey_id, ?report, "Survey draft restored");
        Ok(report)
    }
}
