//! Repository for the `draft_questions` table.

use sqlx::PgPool;
use surveyor_core::error::CoreError;
use surveyor_core::extra_params::{default_extra_params, merge_extra_params, validate_extra_params};
use surveyor_core::label::normalize_label;
use surveyor_core::lifecycle::{DraftState, OptionDisposal, RestoreAction};
use surveyor_core::question_type::QuestionType;
use surveyor_core::types::{DbId, SortOrder};

use crate::error::StoreError;
use crate::models::outcome::{DeleteOutcome, RestoreOutcome};
use crate::models::question::{DraftQuestion, PublishedQuestion};
use crate::repositories::ordering::{self, QuestionDrafts};
use crate::repositories::question_repo;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, original_id, survey_id, label, question_type, \
    sort_order, extra_params, state, created_at, updated_at";

/// Draft question editing. Every mutation locks the owning survey row first.
pub struct QuestionDraftRepo;

impl QuestionDraftRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DraftQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM draft_questions WHERE id = $1");
        sqlx::query_as::<_, DraftQuestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a draft question only if it belongs to `survey_id`.
    pub async fn find_in_survey(
        pool: &PgPool,
        survey_id: DbId,
        id: DbId,
    ) -> Result<Option<DraftQuestion>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM draft_questions WHERE id = $1 AND survey_id = $2");
        sqlx::query_as::<_, DraftQuestion>(&query)
            .bind(id)
            .bind(survey_id)
            .fetch_optional(pool)
            .await
    }

    /// List every draft question of a survey, deleted ones included.
    ///
    /// Live drafts come first in position order, followed by deleted drafts.
    pub async fn list_for_survey(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<DraftQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM draft_questions \
             WHERE survey_id = $1 \
             ORDER BY (state = 'DELETED'), sort_order, id"
        );
        sqlx::query_as::<_, DraftQuestion>(&query)
            .bind(survey_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Append a new question of `question_type` to the end of the survey.
    pub async fn create(
        pool: &PgPool,
        survey_id: DbId,
        question_type: QuestionType,
    ) -> Result<DraftQuestion, StoreError> {
        let mut tx = pool.begin().await?;
        ordering::lock_scope::<QuestionDrafts>(&mut tx, survey_id).await?;
        let next = ordering::max_live_order::<QuestionDrafts>(&mut tx, survey_id).await? + 1;

        let query = format!(
            "INSERT INTO draft_questions \
                (survey_id, label, question_type, sort_order, extra_params, state) \
             VALUES ($1, $2, $3, $4, $5, 'NEW') \
             RETURNING {COLUMNS}"
        );
        let draft = sqlx::query_as::<_, DraftQuestion>(&query)
            .bind(survey_id)
            .bind(question_type.default_label())
            .bind(question_type.as_str())
            .bind(next)
            .bind(default_extra_params())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(survey_id, id = draft.id, %question_type, "Created draft question");
        Ok(draft)
    }

    pub async fn update_label(
        pool: &PgPool,
        id: DbId,
        label: &str,
    ) -> Result<DraftQuestion, StoreError> {
        let label = normalize_label(label)?;
        let mut tx = pool.begin().await?;
        let draft = Self::lock(&mut tx, id).await?;
        ordering::relabel::<QuestionDrafts>(&mut tx, id, draft.state, &label).await?;
        let draft = Self::fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(draft)
    }

    /// Change the question type.
    ///
    /// Option drafts are discarded: a never-published question simply loses
    /// them, a published-backed one has its published options marked for
    /// removal and its unpublished additions purged.
    pub async fn update_type(
        pool: &PgPool,
        id: DbId,
        question_type: QuestionType,
    ) -> Result<DraftQuestion, StoreError> {
        let mut tx = pool.begin().await?;
        let draft = Self::lock(&mut tx, id).await?;
        let change = draft.state.on_type_change()?;
        if draft.question_type == question_type {
            return Err(CoreError::Validation(format!(
                "Question is already of type '{question_type}'"
            ))
            .into());
        }

        match change.options {
            OptionDisposal::Purge => {
                sqlx::query("DELETE FROM draft_options WHERE question_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
            OptionDisposal::Retire => {
                sqlx::query(
                    "DELETE FROM draft_options WHERE question_id = $1 AND original_id IS NULL",
                )
                .bind(id)
                .execute(&mut *tx)
                .await?;
                sqlx::query(
                    "UPDATE draft_options SET state = 'DELETED' \
                     WHERE question_id = $1 AND original_id IS NOT NULL",
                )
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
        }

        let query = format!(
            "UPDATE draft_questions SET question_type = $2, state = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let draft = sqlx::query_as::<_, DraftQuestion>(&query)
            .bind(id)
            .bind(question_type.as_str())
            .bind(change.state.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(draft)
    }

    /// Move the question to `new_order` within its survey.
    pub async fn update_order(
        pool: &PgPool,
        id: DbId,
        new_order: SortOrder,
    ) -> Result<DraftQuestion, StoreError> {
        let mut tx = pool.begin().await?;
        let draft = Self::lock(&mut tx, id).await?;
        ordering::move_to::<QuestionDrafts>(
            &mut tx,
            draft.survey_id,
            id,
            draft.sort_order,
            draft.state,
            new_order,
        )
        .await?;
        let draft = Self::fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(draft)
    }

    /// Shallow-merge `patch` into the stored extra params and validate the
    /// result against the question's current type.
    pub async fn update_extra_params(
        pool: &PgPool,
        id: DbId,
        patch: &serde_json::Value,
    ) -> Result<DraftQuestion, StoreError> {
        let mut tx = pool.begin().await?;
        let draft = Self::lock(&mut tx, id).await?;
        let next = draft.state.on_edit()?;
        let merged = merge_extra_params(&draft.extra_params, patch)?;
        validate_extra_params(draft.question_type, &merged)?;

        let query = format!(
            "UPDATE draft_questions SET extra_params = $2, state = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let draft = sqlx::query_as::<_, DraftQuestion>(&query)
            .bind(id)
            .bind(merged)
            .bind(next.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(draft)
    }

    /// Remove a never-published question or mark a published one deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<DeleteOutcome, StoreError> {
        let mut tx = pool.begin().await?;
        let draft = Self::lock(&mut tx, id).await?;
        let outcome = ordering::remove::<QuestionDrafts>(
            &mut tx,
            draft.survey_id,
            id,
            draft.sort_order,
            draft.state,
        )
        .await?;
        tx.commit().await?;
        tracing::debug!(survey_id = draft.survey_id, id, ?outcome, "Deleted draft question");
        Ok(outcome)
    }

    /// Discard draft edits to a question.
    ///
    /// A never-published draft is purged. A published-backed draft gets the
    /// published payload, position, and options back and becomes `ACTUAL`.
    pub async fn restore(
        pool: &PgPool,
        id: DbId,
    ) -> Result<RestoreOutcome<DraftQuestion>, StoreError> {
        let mut tx = pool.begin().await?;
        let outcome = Self::restore_in_tx(&mut tx, id).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Restore one draft question within an existing transaction.
    async fn restore_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<RestoreOutcome<DraftQuestion>, StoreError> {
        let draft = Self::lock(tx, id).await?;

        let original_id = match DraftState::on_restore(draft.original_id) {
            RestoreAction::Purge => {
                ordering::purge::<QuestionDrafts>(
                    tx,
                    draft.survey_id,
                    id,
                    draft.sort_order,
                    draft.state,
                )
                .await?;
                return Ok(RestoreOutcome::Purged { id });
            }
            RestoreAction::Resync(original_id) => original_id,
        };

        let published = question_repo::fetch_published(tx, original_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Question", original_id))?;
        Self::ensure_same_survey(&draft, &published)?;

        ordering::restore_position::<QuestionDrafts>(
            tx,
            draft.survey_id,
            id,
            draft.sort_order,
            draft.state,
            published.sort_order,
        )
        .await?;

        sqlx::query(
            "UPDATE draft_questions \
             SET label = $2, question_type = $3, extra_params = $4, state = 'ACTUAL' \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&published.label)
        .bind(published.question_type.as_str())
        .bind(&published.extra_params)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM draft_options WHERE question_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO draft_options (original_id, question_id, label, sort_order, state) \
             SELECT id, $1, label, sort_order, 'ACTUAL' FROM options WHERE question_id = $2",
        )
        .bind(id)
        .bind(original_id)
        .execute(&mut **tx)
        .await?;

        let draft = Self::fetch(tx, id).await?;
        Ok(RestoreOutcome::Restored { draft })
    }

    /// Lock the owning survey, then the draft row, and return the draft.
    async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<DraftQuestion, StoreError> {
        let survey_id =
            sqlx::query_scalar::<_, DbId>("SELECT survey_id FROM draft_questions WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| StoreError::not_found("DraftQuestion", id))?;
        ordering::lock_scope::<QuestionDrafts>(tx, survey_id).await?;

        let query = format!("SELECT {COLUMNS} FROM draft_questions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, DraftQuestion>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| StoreError::not_found("DraftQuestion", id))
    }

    async fn fetch(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<DraftQuestion, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM draft_questions WHERE id = $1");
        let draft = sqlx::query_as::<_, DraftQuestion>(&query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(draft)
    }

    fn ensure_same_survey(
        draft: &DraftQuestion,
        published: &PublishedQuestion,
    ) -> Result<(), CoreError> {
        if draft.survey_id != published.survey_id {
            return Err(CoreError::Internal(format!(
                "draft question {} links to question {} of another survey",
                draft.id, published.id
            )));
        }
        Ok(())
    }
}
