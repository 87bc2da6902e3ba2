//! Repository for the `draft_options` table.
//!
//! Options are addressed through their parent draft question. Every mutation
//! locks the owning survey and then the parent row, the same order question
//! edits and publishing use, so option writers serialize with both.

use sqlx::PgPool;
use surveyor_core::error::CoreError;
use surveyor_core::label::normalize_label;
use surveyor_core::lifecycle::{DraftState, RestoreAction};
use surveyor_core::question_type::DEFAULT_OPTION_LABEL;
use surveyor_core::types::{DbId, SortOrder};

use crate::error::StoreError;
use crate::models::option::DraftOption;
use crate::models::outcome::{DeleteOutcome, RestoreOutcome};
use crate::models::question::DraftQuestion;
use crate::repositories::ordering::{self, OptionDrafts, QuestionDrafts};
use crate::repositories::{question_draft_repo, question_repo};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, original_id, question_id, label, sort_order, state, created_at, updated_at";

/// Draft option editing.
pub struct OptionDraftRepo;

impl OptionDraftRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DraftOption>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM draft_options WHERE id = $1");
        sqlx::query_as::<_, DraftOption>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every option draft of a question, deleted ones last.
    pub async fn list_for_question(
        pool: &PgPool,
        question_id: DbId,
    ) -> Result<Vec<DraftOption>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM draft_options \
             WHERE question_id = $1 \
             ORDER BY (state = 'DELETED'), sort_order, id"
        );
        sqlx::query_as::<_, DraftOption>(&query)
            .bind(question_id)
            .fetch_all(pool)
            .await
    }

    /// List the option drafts of every question in a survey, grouped by
    /// draft question.
    pub async fn list_for_survey(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<DraftOption>, sqlx::Error> {
        sqlx::query_as::<_, DraftOption>(
            "SELECT o.id, o.original_id, o.question_id, o.label, o.sort_order, o.state, \
                    o.created_at, o.updated_at \
             FROM draft_options o \
             JOIN draft_questions q ON q.id = o.question_id \
             WHERE q.survey_id = $1 \
             ORDER BY o.question_id, (o.state = 'DELETED'), o.sort_order, o.id",
        )
        .bind(survey_id)
        .fetch_all(pool)
        .await
    }

    /// Append an option to a choice question.
    ///
    /// The parent must not be marked deleted and its type must support
    /// options. `label` falls back to the default option label.
    pub async fn create(
        pool: &PgPool,
        question_id: DbId,
        label: Option<&str>,
    ) -> Result<DraftOption, StoreError> {
        let label = match label {
            Some(raw) => normalize_label(raw)?,
            None => DEFAULT_OPTION_LABEL.to_string(),
        };

        let mut tx = pool.begin().await?;
        let parent = Self::lock_parent(&mut tx, question_id).await?;
        parent.question_type.ensure_supports_options()?;
        let next = ordering::max_live_order::<OptionDrafts>(&mut tx, question_id).await? + 1;

        let query = format!(
            "INSERT INTO draft_options (question_id, label, sort_order, state) \
             VALUES ($1, $2, $3, 'NEW') \
             RETURNING {COLUMNS}"
        );
        let option = sqlx::query_as::<_, DraftOption>(&query)
            .bind(question_id)
            .bind(&label)
            .bind(next)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(question_id, id = option.id, "Created draft option");
        Ok(option)
    }

    pub async fn update_label(
        pool: &PgPool,
        question_id: DbId,
        id: DbId,
        label: &str,
    ) -> Result<DraftOption, StoreError> {
        let label = normalize_label(label)?;
        let mut tx = pool.begin().await?;
        let (parent, option) = Self::lock(&mut tx, question_id, id).await?;
        parent.question_type.ensure_supports_options()?;
        ordering::relabel::<OptionDrafts>(&mut tx, id, option.state, &label).await?;
        let option = Self::fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(option)
    }

    /// Move the option to `new_order` within its question.
    pub async fn update_order(
        pool: &PgPool,
        question_id: DbId,
        id: DbId,
        new_order: SortOrder,
    ) -> Result<DraftOption, StoreError> {
        let mut tx = pool.begin().await?;
        let (parent, option) = Self::lock(&mut tx, question_id, id).await?;
        parent.question_type.ensure_supports_options()?;
        ordering::move_to::<OptionDrafts>(
            &mut tx,
            question_id,
            id,
            option.sort_order,
            option.state,
            new_order,
        )
        .await?;
        let option = Self::fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(option)
    }

    pub async fn delete(
        pool: &PgPool,
        question_id: DbId,
        id: DbId,
    ) -> Result<DeleteOutcome, StoreError> {
        let mut tx = pool.begin().await?;
        let (_, option) = Self::lock(&mut tx, question_id, id).await?;
        let outcome = ordering::remove::<OptionDrafts>(
            &mut tx,
            question_id,
            id,
            option.sort_order,
            option.state,
        )
        .await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// Discard draft edits to an option: purge it if it was never published,
    /// otherwise copy the published label and position back.
    ///
    /// The parent must still be of a type that supports options; after a type
    /// change the whole question has to be restored instead.
    pub async fn restore(
        pool: &PgPool,
        question_id: DbId,
        id: DbId,
    ) -> Result<RestoreOutcome<DraftOption>, StoreError> {
        let mut tx = pool.begin().await?;
        let (parent, option) = Self::lock(&mut tx, question_id, id).await?;
        parent.question_type.ensure_supports_options()?;

        let original_id = match DraftState::on_restore(option.original_id) {
            RestoreAction::Purge => {
                ordering::purge::<OptionDrafts>(
                    &mut tx,
                    question_id,
                    id,
                    option.sort_order,
                    option.state,
                )
                .await?;
                tx.commit().await?;
                return Ok(RestoreOutcome::Purged { id });
            }
            RestoreAction::Resync(original_id) => original_id,
        };

        let published = question_repo::fetch_published_option(&mut tx, original_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Option", original_id))?;
        if parent.original_id != Some(published.question_id) {
            return Err(CoreError::Internal(format!(
                "draft option {id} links to option {original_id} of another question"
            ))
            .into());
        }

        ordering::restore_position::<OptionDrafts>(
            &mut tx,
            question_id,
            id,
            option.sort_order,
            option.state,
            published.sort_order,
        )
        .await?;

        sqlx::query("UPDATE draft_options SET label = $2, state = 'ACTUAL' WHERE id = $1")
            .bind(id)
            .bind(&published.label)
            .execute(&mut *tx)
            .await?;

        let option = Self::fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(RestoreOutcome::Restored { draft: option })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Lock the owning survey, then the parent draft question, which must
    /// still be live.
    async fn lock_parent(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        question_id: DbId,
    ) -> Result<DraftQuestion, StoreError> {
        let survey_id = sqlx::query_scalar::<_, DbId>(
            "SELECT survey_id FROM draft_questions WHERE id = $1",
        )
        .bind(question_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| StoreError::not_found("DraftQuestion", question_id))?;
        ordering::lock_scope::<QuestionDrafts>(tx, survey_id).await?;

        let query = format!(
            "SELECT {} FROM draft_questions WHERE id = $1 FOR UPDATE",
            question_draft_repo::COLUMNS
        );
        let parent = sqlx::query_as::<_, DraftQuestion>(&query)
            .bind(question_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| StoreError::not_found("DraftQuestion", question_id))?;

        if parent.state == DraftState::Deleted {
            return Err(CoreError::InvalidState(format!(
                "question {question_id} is marked as deleted; restore it before editing its options"
            ))
            .into());
        }
        Ok(parent)
    }

    /// Lock the parent, then the option, checking the option belongs to it.
    async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        question_id: DbId,
        id: DbId,
    ) -> Result<(DraftQuestion, DraftOption), StoreError> {
        let parent = Self::lock_parent(tx, question_id).await?;

        let query = format!("SELECT {COLUMNS} FROM draft_options WHERE id = $1 FOR UPDATE");
        let option = sqlx::query_as::<_, DraftOption>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| StoreError::not_found("DraftOption", id))?;

        if option.question_id != question_id {
            return Err(CoreError::InvalidParent {
                entity: "DraftOption",
                id,
                parent_id: question_id,
            }
            .into());
        }
        Ok((parent, option))
    }

    async fn fetch(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<DraftOption, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM draft_options WHERE id = $1");
        let option = sqlx::query_as::<_, DraftOption>(&query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(option)
    }
}
