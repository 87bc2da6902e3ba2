//! Route definitions for surveys and their draft questions and options.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::{option, question, survey};
use crate::state::AppState;

/// Routes mounted at `/surveys`.
///
/// ```text
/// POST   /                                              survey::create
/// GET    /{id}                                          survey::get_by_id
/// PATCH  /{id}                                          survey::update_title
/// GET    /{id}/draft                                    survey::draft
/// GET    /{id}/published                                survey::published
/// POST   /{id}/publish                                  survey::publish
/// PUT    /{id}/restore                                  survey::restore
///
/// POST   /{id}/questions                                question::create
/// PATCH  /{id}/questions/{qid}                          question::update_label
/// DELETE /{id}/questions/{qid}                          question::delete
/// PATCH  /{id}/questions/{qid}/type                     question::update_type
/// PATCH  /{id}/questions/{qid}/order                    question::update_order
/// PATCH  /{id}/questions/{qid}/extra-params             question::update_extra_params
/// PUT    /{id}/questions/{qid}/restore                  question::restore
///
/// POST   /{id}/questions/{qid}/options                  option::create
/// PATCH  /{id}/questions/{qid}/options/{oid}            option::update_label
/// DELETE /{id}/questions/{qid}/options/{oid}            option::delete
/// PATCH  /{id}/questions/{qid}/options/{oid}/order      option::update_order
/// PUT    /{id}/questions/{qid}/options/{oid}/restore    option::restore
/// ```
pub fn router() -> Router<AppState> {
    let option_routes = Router::new()
        .route("/", post(option::create))
        .route(
            "/{option_id}",
            patch(option::update_label).delete(option::delete),
        )
        .route("/{option_id}/order", patch(option::update_order))
        .route("/{option_id}/restore", put(option::restore));

    let question_routes = Router::new()
        .route("/", post(question::create))
        .route(
            "/{question_id}",
            patch(question::update_label).delete(question::delete),
        )
        .route("/{question_id}/type", patch(question::update_type))
        .route("/{question_id}/order", patch(question::update_order))
        .route(
            "/{question_id}/extra-params",
            patch(question::update_extra_params),
        )
        .route("/{question_id}/restore", put(question::restore))
        .nest("/{question_id}/options", option_routes);

    Router::new()
        .route("/", post(survey::create))
        .route(
            "/{survey_id}",
            get(survey::get_by_id).patch(survey::update_title),
        )
        .route("/{survey_id}/draft", get(survey::draft))
        .route("/{survey_id}/published", get(survey::published))
        .route("/{survey_id}/publish", post(survey::publish))
        .route("/{survey_id}/restore", put(survey::restore))
        .nest("/{survey_id}/questions", question_routes)
}
