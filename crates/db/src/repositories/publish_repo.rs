//! Publishing: reconcile the draft tree of a survey onto the published
//! tables in one transaction.

use std::collections::HashMap;

use sqlx::PgPool;
use surveyor_core::error::CoreError;
use surveyor_core::ordering::is_contiguous;
use surveyor_core::types::{DbId, SortOrder};

use crate::error::StoreError;
use crate::models::option::DraftOption;
use crate::models::outcome::PublishReport;
use crate::models::question::DraftQuestion;
use crate::repositories::ordering::{self, QuestionDrafts};
use crate::repositories::question_draft_repo;

/// A `NEW` draft question awaiting its first publish.
#[derive(sqlx::FromRow)]
struct PendingQuestion {
    id: DbId,
    label: String,
    question_type: String,
    sort_order: SortOrder,
    extra_params: serde_json::Value,
}

/// A `NEW` draft option together with the published id of its question.
#[derive(sqlx::FromRow)]
struct PendingOption {
    id: DbId,
    question_id: DbId,
    published_question_id: Option<DbId>,
    label: String,
    sort_order: SortOrder,
}

/// Applies a survey's draft tree to the published tables.
pub struct PublishRepo;

impl PublishRepo {
    /// Publish the draft of `survey_id`.
    ///
    /// Runs as a single transaction holding the survey row lock: either every
    /// step lands or none does. Afterwards every surviving draft is `ACTUAL`
    /// and linked to a published row with identical content and position, so
    /// publishing again immediately changes nothing.
    pub async fn publish(pool: &PgPool, survey_id: DbId) -> Result<PublishReport, StoreError> {
        let mut tx = pool.begin().await?;
        ordering::lock_scope::<QuestionDrafts>(&mut tx, survey_id).await?;
        Self::ensure_contiguous(&mut tx, survey_id).await?;

        let mut report = PublishReport::default();

        // Survey title and state.
        sqlx::query(
            "UPDATE surveys s SET title = d.title, state = 'ACTIVE' \
             FROM survey_drafts d \
             WHERE s.id = $1 AND d.survey_id = s.id",
        )
        .bind(survey_id)
        .execute(&mut *tx)
        .await?;

        // Questions.
        report.questions_created = Self::insert_new_questions(&mut tx, survey_id).await?;
        report.questions_updated = Self::sync_questions(&mut tx, survey_id).await?;
        report.questions_deleted = Self::delete_questions(&mut tx, survey_id).await?;

        // Options.
        report.options_created = Self::insert_new_options(&mut tx, survey_id).await?;
        report.options_updated = Self::sync_options(&mut tx, survey_id).await?;
        report.options_deleted = Self::delete_options(&mut tx, survey_id).await?;

        tx.commit().await?;
        tracing::info!(survey_id, ?report, "Survey published");
        Ok(report)
    }

    /// Published orders are copied verbatim from the drafts, so refuse to
    /// publish a draft tree whose live orders are not `1..=N` per scope.
    async fn ensure_contiguous(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        survey_id: DbId,
    ) -> Result<(), StoreError> {
        let query = format!(
            "SELECT {} FROM draft_questions WHERE survey_id = $1",
            question_draft_repo::COLUMNS
        );
        let questions = sqlx::query_as::<_, DraftQuestion>(&query)
            .bind(survey_id)
            .fetch_all(&mut **tx)
            .await?;
        if !is_contiguous(&questions) {
            return Err(CoreError::Internal(format!(
                "draft question orders of survey {survey_id} are not contiguous"
            ))
            .into());
        }

        let options = sqlx::query_as::<_, DraftOption>(
            "SELECT o.id, o.original_id, o.question_id, o.label, o.sort_order, o.state, \
                    o.created_at, o.updated_at \
             FROM draft_options o \
             JOIN draft_questions q ON q.id = o.question_id \
             WHERE q.survey_id = $1",
        )
        .bind(survey_id)
        .fetch_all(&mut **tx)
        .await?;
        let mut by_question: HashMap<DbId, Vec<DraftOption>> = HashMap::new();
        for option in options {
            by_question.entry(option.question_id).or_default().push(option);
        }
        if let Some(question_id) = by_question
            .iter()
            .find_map(|(id, options)| (!is_contiguous(options)).then_some(*id))
        {
            return Err(CoreError::Internal(format!(
                "draft option orders of question {question_id} are not contiguous"
            ))
            .into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Question steps
    // -----------------------------------------------------------------------

    async fn insert_new_questions(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        survey_id: DbId,
    ) -> Result<u64, StoreError> {
        let pending = sqlx::query_as::<_, PendingQuestion>(
            "SELECT id, label, question_type, sort_order, extra_params \
             FROM draft_questions \
             WHERE survey_id = $1 AND state = 'NEW' \
             ORDER BY sort_order",
        )
        .bind(survey_id)
        .fetch_all(&mut **tx)
        .await?;

        for draft in &pending {
            let published_id = sqlx::query_scalar::<_, DbId>(
                "INSERT INTO questions (survey_id, label, question_type, sort_order, extra_params) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id",
            )
            .bind(survey_id)
            .bind(&draft.label)
            .bind(&draft.question_type)
            .bind(draft.sort_order)
            .bind(&draft.extra_params)
            .fetch_one(&mut **tx)
            .await?;

            sqlx::query(
                "UPDATE draft_questions SET original_id = $2, state = 'ACTUAL' WHERE id = $1",
            )
            .bind(draft.id)
            .bind(published_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(pending.len() as u64)
    }

    /// Copy every live linked draft onto its published question, then mark
    /// the changed ones `ACTUAL`. Returns the number of changed drafts.
    ///
    /// Every live linked draft must land on a question of the same survey.
    async fn sync_questions(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        survey_id: DbId,
    ) -> Result<u64, StoreError> {
        let linked = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM draft_questions \
             WHERE survey_id = $1 AND state IN ('ACTUAL', 'CHANGED')",
        )
        .bind(survey_id)
        .fetch_one(&mut **tx)
        .await?;

        let synced = sqlx::query(
            "UPDATE questions q \
             SET label = d.label, question_type = d.question_type, \
                 sort_order = d.sort_order, extra_params = d.extra_params \
             FROM draft_questions d \
             WHERE d.original_id = q.id AND d.survey_id = $1 AND q.survey_id = $1 \
               AND d.state IN ('ACTUAL', 'CHANGED')",
        )
        .bind(survey_id)
        .execute(&mut **tx)
        .await?;
        require_all_synced(synced.rows_affected(), linked, "draft question")?;

        let changed = sqlx::query(
            "UPDATE draft_questions SET state = 'ACTUAL' \
             WHERE survey_id = $1 AND state = 'CHANGED'",
        )
        .bind(survey_id)
        .execute(&mut **tx)
        .await?;
        Ok(changed.rows_affected())
    }

    /// Drop `DELETED` drafts (their option drafts cascade) and then the
    /// published questions and options they pointed at.
    async fn delete_questions(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        survey_id: DbId,
    ) -> Result<u64, StoreError> {
        let originals = sqlx::query_scalar::<_, Option<DbId>>(
            "DELETE FROM draft_questions \
             WHERE survey_id = $1 AND state = 'DELETED' \
             RETURNING original_id",
        )
        .bind(survey_id)
        .fetch_all(&mut **tx)
        .await?;
        let originals = require_links(originals, "draft question")?;
        if originals.is_empty() {
            return Ok(0);
        }

        sqlx::query("DELETE FROM options WHERE question_id = ANY($1)")
            .bind(&originals)
            .execute(&mut **tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM questions WHERE id = ANY($1) AND survey_id = $2")
            .bind(&originals)
            .bind(survey_id)
            .execute(&mut **tx)
            .await?;
        Ok(deleted.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Option steps
    // -----------------------------------------------------------------------

    async fn insert_new_options(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        survey_id: DbId,
    ) -> Result<u64, StoreError> {
        let pending = sqlx::query_as::<_, PendingOption>(
            "SELECT o.id, o.question_id, q.original_id AS published_question_id, \
                    o.label, o.sort_order \
             FROM draft_options o \
             JOIN draft_questions q ON q.id = o.question_id \
             WHERE q.survey_id = $1 AND o.state = 'NEW' \
             ORDER BY o.question_id, o.sort_order",
        )
        .bind(survey_id)
        .fetch_all(&mut **tx)
        .await?;

        for draft in &pending {
            let question_id = draft.published_question_id.ok_or_else(|| {
                CoreError::Internal(format!(
                    "draft question {} has no published counterpart after publishing questions",
                    draft.question_id
                ))
            })?;

            let published_id = sqlx::query_scalar::<_, DbId>(
                "INSERT INTO options (question_id, label, sort_order) \
                 VALUES ($1, $2, $3) \
                 RETURNING id",
            )
            .bind(question_id)
            .bind(&draft.label)
            .bind(draft.sort_order)
            .fetch_one(&mut **tx)
            .await?;

            sqlx::query(
                "UPDATE draft_options SET original_id = $2, state = 'ACTUAL' WHERE id = $1",
            )
            .bind(draft.id)
            .bind(published_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(pending.len() as u64)
    }

    /// Same as [`Self::sync_questions`]; each option must stay under the
    /// published question its parent draft mirrors.
    async fn sync_options(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        survey_id: DbId,
    ) -> Result<u64, StoreError> {
        let linked = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM draft_options o \
             JOIN draft_questions q ON q.id = o.question_id \
             WHERE q.survey_id = $1 AND o.state IN ('ACTUAL', 'CHANGED')",
        )
        .bind(survey_id)
        .fetch_one(&mut **tx)
        .await?;

        let synced = sqlx::query(
            "UPDATE options p \
             SET label = o.label, sort_order = o.sort_order \
             FROM draft_options o \
             JOIN draft_questions q ON q.id = o.question_id \
             WHERE o.original_id = p.id AND p.question_id = q.original_id \
               AND q.survey_id = $1 AND o.state IN ('ACTUAL', 'CHANGED')",
        )
        .bind(survey_id)
        .execute(&mut **tx)
        .await?;
        require_all_synced(synced.rows_affected(), linked, "draft option")?;

        let changed = sqlx::query(
            "UPDATE draft_options o SET state = 'ACTUAL' \
             FROM draft_questions q \
             WHERE q.id = o.question_id AND q.survey_id = $1 AND o.state = 'CHANGED'",
        )
        .bind(survey_id)
        .execute(&mut **tx)
        .await?;
        Ok(changed.rows_affected())
    }

    async fn delete_options(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        survey_id: DbId,
    ) -> Result<u64, StoreError> {
        let originals = sqlx::query_scalar::<_, Option<DbId>>(
            "DELETE FROM draft_options o \
             USING draft_questions q \
             WHERE q.id = o.question_id AND q.survey_id = $1 AND o.state = 'DELETED' \
             RETURNING o.original_id",
        )
        .bind(survey_id)
        .fetch_all(&mut **tx)
        .await?;
        let originals = require_links(originals, "draft option")?;
        if originals.is_empty() {
            return Ok(0);
        }

        let deleted = sqlx::query("DELETE FROM options WHERE id = ANY($1)")
            .bind(&originals)
            .execute(&mut **tx)
            .await?;
        Ok(deleted.rows_affected())
    }
}

/// A linked draft whose published row lies outside its scope is not synced;
/// abort rather than publish a partial mirror.
fn require_all_synced(synced: u64, linked: i64, entity: &str) -> Result<(), CoreError> {
    if synced as i64 != linked {
        return Err(CoreError::Internal(format!(
            "{linked} live linked {entity}s but only {synced} published rows matched"
        )));
    }
    Ok(())
}

/// Every `DELETED` draft must be linked; the table constraint guarantees it.
fn require_links(originals: Vec<Option<DbId>>, entity: &str) -> Result<Vec<DbId>, CoreError> {
    originals
        .into_iter()
        .map(|id| {
            id.ok_or_else(|| CoreError::Internal(format!("deleted {entity} without original_id")))
        })
        .collect()
}
