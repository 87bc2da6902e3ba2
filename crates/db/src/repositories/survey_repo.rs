//! Repository for the `surveys` and `survey_drafts` tables, plus the
//! composed editor and published views.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;
use surveyor_core::label::normalize_label;
use surveyor_core::types::DbId;

use crate::error::StoreError;
use crate::models::option::{DraftOption, PublishedOption};
use crate::models::survey::{
    CreateSurvey, DraftQuestionTree, PublishedQuestionTree, PublishedSurveyView, Survey,
    SurveyDraft, SurveyEditorView,
};
use crate::repositories::{OptionDraftRepo, QuestionDraftRepo, QuestionRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, state, created_at, updated_at";

const DRAFT_COLUMNS: &str = "survey_id, title, created_at, updated_at";

/// Provides survey creation, title editing, and read views.
pub struct SurveyRepo;

impl SurveyRepo {
    /// Insert a survey together with its draft row. Both start with the same
    /// title and the survey starts in `DRAFT` state.
    pub async fn create(pool: &PgPool, input: &CreateSurvey) -> Result<Survey, StoreError> {
        let title = match input.title.as_deref() {
            Some(raw) => normalize_label(raw)?,
            None => format!("Survey from {}", Utc::now().format("%d.%m.%Y")),
        };

        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO surveys (title, state) VALUES ($1, 'DRAFT') RETURNING {COLUMNS}"
        );
        let survey = sqlx::query_as::<_, Survey>(&query)
            .bind(&title)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO survey_drafts (survey_id, title) VALUES ($1, $2)")
            .bind(survey.id)
            .bind(&title)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(survey_id = survey.id, "Survey created");
        Ok(survey)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE id = $1");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_draft(pool: &PgPool, id: DbId) -> Result<Option<SurveyDraft>, sqlx::Error> {
        let query = format!("SELECT {DRAFT_COLUMNS} FROM survey_drafts WHERE survey_id = $1");
        sqlx::query_as::<_, SurveyDraft>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Rename the draft survey. The published title changes on the next
    /// publish.
    pub async fn update_title(
        pool: &PgPool,
        id: DbId,
        title: &str,
    ) -> Result<SurveyDraft, StoreError> {
        let title = normalize_label(title)?;
        let query = format!(
            "UPDATE survey_drafts SET title = $2 WHERE survey_id = $1 RETURNING {DRAFT_COLUMNS}"
        );
        sqlx::query_as::<_, SurveyDraft>(&query)
            .bind(id)
            .bind(&title)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Survey", id))
    }

    /// The draft tree as the editor sees it, deleted drafts included.
    pub async fn editor_view(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SurveyEditorView>, sqlx::Error> {
        let Some(survey) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let Some(draft) = Self::find_draft(pool, id).await? else {
            return Ok(None);
        };

        let questions = QuestionDraftRepo::list_for_survey(pool, id).await?;
        let mut options: HashMap<DbId, Vec<DraftOption>> = HashMap::new();
        for option in OptionDraftRepo::list_for_survey(pool, id).await? {
            options.entry(option.question_id).or_default().push(option);
        }

        let questions = questions
            .into_iter()
            .map(|question| DraftQuestionTree {
                options: options.remove(&question.id).unwrap_or_default(),
                question,
            })
            .collect();

        Ok(Some(SurveyEditorView {
            survey,
            draft_title: draft.title,
            questions,
        }))
    }

    /// The survey as last published.
    pub async fn published_view(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PublishedSurveyView>, sqlx::Error> {
        let Some(survey) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let questions = QuestionRepo::list_for_survey(pool, id).await?;
        let mut options: HashMap<DbId, Vec<PublishedOption>> = HashMap::new();
        for option in QuestionRepo::list_options_for_survey(pool, id).await? {
            options.entry(option.question_id).or_default().push(option);
        }

        let questions = questions
            .into_iter()
            .map(|question| PublishedQuestionTree {
                options: options.remove(&question.id).unwrap_or_default(),
                question,
            })
            .collect();

        Ok(Some(PublishedSurveyView { survey, questions }))
    }
}
