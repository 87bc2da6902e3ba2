//! Read access to the published `questions` and `options` tables.
//!
//! Published rows are only ever written by the publish run, so this
//! repository has no mutations.

use sqlx::PgPool;
use surveyor_core::types::DbId;

use crate::models::option::PublishedOption;
use crate::models::question::PublishedQuestion;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, survey_id, label, question_type, sort_order, extra_params, \
    created_at, updated_at";

const OPTION_COLUMNS: &str = "id, question_id, label, sort_order, created_at, updated_at";

/// Provides lookups of published questions and their options.
pub struct QuestionRepo;

impl QuestionRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PublishedQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM questions WHERE id = $1");
        sqlx::query_as::<_, PublishedQuestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the published questions of a survey in position order.
    pub async fn list_for_survey(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<PublishedQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM questions WHERE survey_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, PublishedQuestion>(&query)
            .bind(survey_id)
            .fetch_all(pool)
            .await
    }

    /// List the published options of one question in position order.
    pub async fn list_options(
        pool: &PgPool,
        question_id: DbId,
    ) -> Result<Vec<PublishedOption>, sqlx::Error> {
        let query = format!(
            "SELECT {OPTION_COLUMNS} FROM options WHERE question_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, PublishedOption>(&query)
            .bind(question_id)
            .fetch_all(pool)
            .await
    }

    /// List the published options of every question in a survey, grouped by
    /// question and in position order within each group.
    pub async fn list_options_for_survey(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<PublishedOption>, sqlx::Error> {
        sqlx::query_as::<_, PublishedOption>(
            "SELECT o.id, o.question_id, o.label, o.sort_order, o.created_at, o.updated_at \
             FROM options o \
             JOIN questions q ON q.id = o.question_id \
             WHERE q.survey_id = $1 \
             ORDER BY o.question_id, o.sort_order, o.id",
        )
            .bind(survey_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_option(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PublishedOption>, sqlx::Error> {
        let query = format!("SELECT {OPTION_COLUMNS} FROM options WHERE id = $1");
        sqlx::query_as::<_, PublishedOption>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Load a published question inside an open transaction.
pub(crate) async fn fetch_published(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: DbId,
) -> Result<Option<PublishedQuestion>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM questions WHERE id = $1");
    sqlx::query_as::<_, PublishedQuestion>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

/// Load a published option inside an open transaction.
pub(crate) async fn fetch_published_option(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: DbId,
) -> Result<Option<PublishedOption>, sqlx::Error> {
    let query = format!("SELECT {OPTION_COLUMNS} FROM options WHERE id = $1");
    sqlx::query_as::<_, PublishedOption>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}
