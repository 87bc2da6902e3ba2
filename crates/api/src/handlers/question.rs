//! Handlers for draft questions, nested under surveys:
//! `/surveys/{survey_id}/questions[/{question_id}]`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use surveyor_core::question_type::QuestionType;
use surveyor_core::types::DbId;
use surveyor_db::models::outcome::{DeleteOutcome, RestoreOutcome};
use surveyor_db::models::question::{
    CreateDraftQuestion, DraftQuestion, UpdateExtraParams, UpdateLabel, UpdateOrder,
    UpdateQuestionType,
};
use surveyor_db::repositories::QuestionDraftRepo;

use super::ensure_question_in_survey;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/surveys/{survey_id}/questions
pub async fn create(
    State(state): State<AppState>,
    Path(survey_id): Path<DbId>,
    Json(input): Json<CreateDraftQuestion>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftQuestion>>)> {
    let question_type: QuestionType = input.question_type.parse()?;
    let draft = QuestionDraftRepo::create(&state.pool, survey_id, question_type).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: draft })))
}

/// PATCH /api/v1/surveys/{survey_id}/questions/{question_id}
pub async fn update_label(
    State(state): State<AppState>,
    Path((survey_id, question_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateLabel>,
) -> AppResult<Json<DataResponse<DraftQuestion>>> {
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let draft = QuestionDraftRepo::update_label(&state.pool, question_id, &input.label).await?;
    Ok(Json(DataResponse { data: draft }))
}

/// PATCH /api/v1/surveys/{survey_id}/questions/{question_id}/type
pub async fn update_type(
    State(state): State<AppState>,
    Path((survey_id, question_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateQuestionType>,
) -> AppResult<Json<DataResponse<DraftQuestion>>> {
    let question_type: QuestionType = input.question_type.parse()?;
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let draft = QuestionDraftRepo::update_type(&state.pool, question_id, question_type).await?;
    Ok(Json(DataResponse { data: draft }))
}

/// PATCH /api/v1/surveys/{survey_id}/questions/{question_id}/order
pub async fn update_order(
    State(state): State<AppState>,
    Path((survey_id, question_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateOrder>,
) -> AppResult<Json<DataResponse<DraftQuestion>>> {
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let draft = QuestionDraftRepo::update_order(&state.pool, question_id, input.new_order).await?;
    Ok(Json(DataResponse { data: draft }))
}

/// PATCH /api/v1/surveys/{survey_id}/questions/{question_id}/extra-params
///
/// The body's `extra_params` object is merged over the stored one.
pub async fn update_extra_params(
    State(state): State<AppState>,
    Path((survey_id, question_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateExtraParams>,
) -> AppResult<Json<DataResponse<DraftQuestion>>> {
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let draft =
        QuestionDraftRepo::update_extra_params(&state.pool, question_id, &input.extra_params)
            .await?;
    Ok(Json(DataResponse { data: draft }))
}

/// DELETE /api/v1/surveys/{survey_id}/questions/{question_id}
pub async fn delete(
    State(state): State<AppState>,
    Path((survey_id, question_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<DeleteOutcome>>> {
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let outcome = QuestionDraftRepo::delete(&state.pool, question_id).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// PUT /api/v1/surveys/{survey_id}/questions/{question_id}/restore
pub async fn restore(
    State(state): State<AppState>,
    Path((survey_id, question_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<RestoreOutcome<DraftQuestion>>>> {
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let outcome = QuestionDraftRepo::restore(&state.pool, question_id).await?;
    Ok(Json(DataResponse { data: outcome }))
}
