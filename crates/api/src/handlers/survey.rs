//! Handlers for the `/surveys` resource: survey lifecycle, views, publish,
//! and whole-survey restore.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use surveyor_core::error::CoreError;
use surveyor_core::types::DbId;
use surveyor_db::models::outcome::{PublishReport, RestoreReport};
use surveyor_db::models::survey::{
    CreateSurvey, PublishedSurveyView, Survey, SurveyDraft, SurveyEditorView, UpdateSurveyTitle,
};
use surveyor_db::repositories::{PublishRepo, RestoreRepo, SurveyRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn survey_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Survey",
        id,
    })
}

/// POST /api/v1/surveys
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSurvey>,
) -> AppResult<(StatusCode, Json<DataResponse<Survey>>)> {
    let survey = SurveyRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: survey })))
}

/// GET /api/v1/surveys/{id}
///
/// Returns the published survey row.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Survey>>> {
    let survey = SurveyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| survey_not_found(id))?;
    Ok(Json(DataResponse { data: survey }))
}

/// PATCH /api/v1/surveys/{id}
///
/// Renames the draft; the published title follows on the next publish.
pub async fn update_title(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSurveyTitle>,
) -> AppResult<Json<DataResponse<SurveyDraft>>> {
    let draft = SurveyRepo::update_title(&state.pool, id, &input.title).await?;
    Ok(Json(DataResponse { data: draft }))
}

/// GET /api/v1/surveys/{id}/draft
pub async fn draft(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SurveyEditorView>>> {
    let view = SurveyRepo::editor_view(&state.pool, id)
        .await?
        .ok_or_else(|| survey_not_found(id))?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/surveys/{id}/published
pub async fn published(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PublishedSurveyView>>> {
    let view = SurveyRepo::published_view(&state.pool, id)
        .await?
        .ok_or_else(|| survey_not_found(id))?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/surveys/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PublishReport>>> {
    let report = PublishRepo::publish(&state.pool, id).await?;
    Ok(Json(DataResponse { data: report }))
}

/// PUT /api/v1/surveys/{id}/restore
///
/// On error some questions may already have been restored; the call can be
/// repeated safely.
pub async fn restore(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RestoreReport>>> {
    let report = RestoreRepo::restore_survey(&state.pool, id).await?;
    Ok(Json(DataResponse { data: report }))
}
