//! Handlers for draft options, nested under draft questions:
//! `/surveys/{survey_id}/questions/{question_id}/options[/{option_id}]`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use surveyor_core::types::DbId;
use surveyor_db::models::option::{CreateDraftOption, DraftOption};
use surveyor_db::models::outcome::{DeleteOutcome, RestoreOutcome};
use surveyor_db::models::question::{UpdateLabel, UpdateOrder};
use surveyor_db::repositories::OptionDraftRepo;

use super::ensure_question_in_survey;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/surveys/{survey_id}/questions/{question_id}/options
pub async fn create(
    State(state): State<AppState>,
    Path((survey_id, question_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateDraftOption>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftOption>>)> {
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let option = OptionDraftRepo::create(&state.pool, question_id, input.label.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: option })))
}

/// PATCH /api/v1/surveys/{survey_id}/questions/{question_id}/options/{option_id}
pub async fn update_label(
    State(state): State<AppState>,
    Path((survey_id, question_id, option_id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<UpdateLabel>,
) -> AppResult<Json<DataResponse<DraftOption>>> {
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let option =
        OptionDraftRepo::update_label(&state.pool, question_id, option_id, &input.label).await?;
    Ok(Json(DataResponse { data: option }))
}

/// PATCH /api/v1/surveys/{survey_id}/questions/{question_id}/options/{option_id}/order
pub async fn update_order(
    State(state): State<AppState>,
    Path((survey_id, question_id, option_id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<UpdateOrder>,
) -> AppResult<Json<DataResponse<DraftOption>>> {
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let option =
        OptionDraftRepo::update_order(&state.pool, question_id, option_id, input.new_order)
            .await?;
    Ok(Json(DataResponse { data: option }))
}

/// DELETE /api/v1/surveys/{survey_id}/questions/{question_id}/options/{option_id}
pub async fn delete(
    State(state): State<AppState>,
    Path((survey_id, question_id, option_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<DataResponse<DeleteOutcome>>> {
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let outcome = OptionDraftRepo::delete(&state.pool, question_id, option_id).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// PUT /api/v1/surveys/{survey_id}/questions/{question_id}/options/{option_id}/restore
pub async fn restore(
    State(state): State<AppState>,
    Path((survey_id, question_id, option_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<DataResponse<RestoreOutcome<DraftOption>>>> {
    ensure_question_in_survey(&state, survey_id, question_id).await?;
    let outcome = OptionDraftRepo::restore(&state.pool, question_id, option_id).await?;
    Ok(Json(DataResponse { data: outcome }))
}
