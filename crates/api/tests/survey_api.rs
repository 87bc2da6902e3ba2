//! HTTP-level integration tests for the survey editing API.
//!
//! Surveys, questions and options are driven through the router the same way
//! an editor client would, checking both the `{ "data": ... }` payloads and
//! the error envelope.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, build_test_app, delete, get, patch_json, post_json, put};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_survey(app: &Router, title: &str) -> i64 {
    let response = post_json(app.clone(), "/api/v1/surveys", json!({ "title": title })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_question(app: &Router, survey_id: i64, question_type: &str) -> Value {
    let response = post_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions"),
        json!({ "question_type": question_type }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn create_option(app: &Router, survey_id: i64, question_id: i64, body: Value) -> Value {
    let response = post_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions/{question_id}/options"),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Test: create, publish and read back a survey
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_publish_survey(pool: PgPool) {
    let app = build_test_app(pool);
    let survey_id = create_survey(&app, "Team check-in").await;

    let question = create_question(&app, survey_id, "single_choice").await;
    assert_eq!(question["state"], "NEW");
    assert_eq!(question["sort_order"], 1);
    assert_eq!(question["label"], "Single choice question");
    let question_id = question["id"].as_i64().unwrap();

    let default_option = create_option(&app, survey_id, question_id, json!({})).await;
    assert_eq!(default_option["label"], "Answer option");
    let blue = create_option(&app, survey_id, question_id, json!({ "label": "Blue" })).await;
    assert_eq!(blue["sort_order"], 2);

    let response = post_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/publish"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["data"]["questions_created"], 1);
    assert_eq!(report["data"]["options_created"], 2);

    let survey = body_json(get(app.clone(), &format!("/api/v1/surveys/{survey_id}")).await).await;
    assert_eq!(survey["data"]["state"], "ACTIVE");
    assert_eq!(survey["data"]["title"], "Team check-in");

    let published =
        body_json(get(app.clone(), &format!("/api/v1/surveys/{survey_id}/published")).await)
            .await;
    let questions = published["data"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 1);
    let labels: Vec<&str> = questions[0]["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["Answer option", "Blue"]);

    let draft = body_json(get(app, &format!("/api/v1/surveys/{survey_id}/draft")).await).await;
    assert_eq!(draft["data"]["questions"][0]["state"], "ACTUAL");
    assert_eq!(draft["data"]["questions"][0]["options"][1]["state"], "ACTUAL");
}

// ---------------------------------------------------------------------------
// Test: draft edits and whole-survey restore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rename_and_restore_survey(pool: PgPool) {
    let app = build_test_app(pool);
    let survey_id = create_survey(&app, "Original").await;
    let email = create_question(&app, survey_id, "email").await;
    let email_id = email["id"].as_i64().unwrap();
    post_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/publish"),
        json!({}),
    )
    .await;

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}"),
        json!({ "title": "Renamed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["title"], "Renamed");

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions/{email_id}"),
        json!({ "label": "Work email" }),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["state"], "CHANGED");
    create_question(&app, survey_id, "date").await;

    let response = put(app.clone(), &format!("/api/v1/surveys/{survey_id}/restore")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["data"]["questions_restored"], 1);
    assert_eq!(report["data"]["questions_purged"], 1);

    let draft = body_json(get(app, &format!("/api/v1/surveys/{survey_id}/draft")).await).await;
    assert_eq!(draft["data"]["draft_title"], "Original");
    let questions = draft["data"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0]["label"], "Your email address");
    assert_eq!(questions[0]["state"], "ACTUAL");
}

// ---------------------------------------------------------------------------
// Test: question delete and restore outcomes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_and_restore_question(pool: PgPool) {
    let app = build_test_app(pool);
    let survey_id = create_survey(&app, "Outcomes").await;
    let kept = create_question(&app, survey_id, "rating").await;
    let kept_id = kept["id"].as_i64().unwrap();
    post_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/publish"),
        json!({}),
    )
    .await;
    let fresh = create_question(&app, survey_id, "number").await;
    let fresh_id = fresh["id"].as_i64().unwrap();

    let response = delete(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions/{fresh_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], json!({ "outcome": "purged", "id": fresh_id }));

    let response = delete(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions/{kept_id}"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"], "marked_deleted");

    // A deleted question cannot be edited until it is restored.
    let response = patch_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions/{kept_id}"),
        json!({ "label": "Too late" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");

    let response = put(
        app,
        &format!("/api/v1/surveys/{survey_id}/questions/{kept_id}/restore"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"], "restored");
    assert_eq!(json["data"]["draft"]["state"], "ACTUAL");
    assert_eq!(json["data"]["draft"]["sort_order"], 1);
}

// ---------------------------------------------------------------------------
// Test: reorder, type change and extra params
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_question_edits(pool: PgPool) {
    let app = build_test_app(pool);
    let survey_id = create_survey(&app, "Edits").await;
    let first = create_question(&app, survey_id, "short_text").await;
    let second = create_question(&app, survey_id, "multi_choice").await;
    let second_id = second["id"].as_i64().unwrap();

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions/{second_id}/order"),
        json!({ "new_order": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["sort_order"], 1);

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions/{second_id}/extra-params"),
        json!({ "extra_params": { "maxAnswersCount": 2 } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let params = body_json(response).await["data"]["extra_params"].clone();
    assert_eq!(params["maxAnswersCount"], 2);
    assert_eq!(params["required"], true);

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions/{second_id}/type"),
        json!({ "question_type": "long_text" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["question_type"], "long_text");

    let draft = body_json(get(app, &format!("/api/v1/surveys/{survey_id}/draft")).await).await;
    let ids: Vec<i64> = draft["data"]["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [second_id, first["id"].as_i64().unwrap()]);
}

// ---------------------------------------------------------------------------
// Test: option reorder, delete and restore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_option_edits(pool: PgPool) {
    let app = build_test_app(pool);
    let survey_id = create_survey(&app, "Options").await;
    let question = create_question(&app, survey_id, "single_choice").await;
    let question_id = question["id"].as_i64().unwrap();
    let red = create_option(&app, survey_id, question_id, json!({ "label": "Red" })).await;
    let green = create_option(&app, survey_id, question_id, json!({ "label": "Green" })).await;
    let (red_id, green_id) = (red["id"].as_i64().unwrap(), green["id"].as_i64().unwrap());
    post_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/publish"),
        json!({}),
    )
    .await;

    let base = format!("/api/v1/surveys/{survey_id}/questions/{question_id}/options");

    let response = patch_json(
        app.clone(),
        &format!("{base}/{green_id}/order"),
        json!({ "new_order": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["sort_order"], 1);
    assert_eq!(json["data"]["state"], "CHANGED");

    let response = patch_json(
        app.clone(),
        &format!("{base}/{red_id}"),
        json!({ "label": "Crimson" }),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["label"], "Crimson");

    let response = delete(app.clone(), &format!("{base}/{red_id}")).await;
    assert_eq!(
        body_json(response).await["data"]["outcome"],
        "marked_deleted"
    );

    let response = put(app.clone(), &format!("{base}/{red_id}/restore")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"], "restored");
    assert_eq!(json["data"]["draft"]["label"], "Red");
    assert_eq!(json["data"]["draft"]["sort_order"], 1);

    let response = put(app, &format!("{base}/{green_id}/restore")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["draft"]["sort_order"], 2);
    assert_eq!(json["data"]["draft"]["state"], "ACTUAL");
}

// ---------------------------------------------------------------------------
// Test: error responses
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_survey_returns_404(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app.clone(), "/api/v1/surveys/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response = post_json(
        app,
        "/api/v1/surveys/999999/questions",
        json!({ "question_type": "email" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_question_from_other_survey_returns_404(pool: PgPool) {
    let app = build_test_app(pool);
    let owner = create_survey(&app, "Owner").await;
    let other = create_survey(&app, "Other").await;
    let question = create_question(&app, owner, "email").await;
    let question_id = question["id"].as_i64().unwrap();

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/surveys/{other}/questions/{question_id}"),
        json!({ "label": "Hijacked" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    // The draft is untouched.
    let draft = body_json(get(app, &format!("/api/v1/surveys/{owner}/draft")).await).await;
    assert_eq!(draft["data"]["questions"][0]["label"], "Your email address");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_validation_errors_return_400(pool: PgPool) {
    let app = build_test_app(pool);
    let survey_id = create_survey(&app, "Validation").await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions"),
        json!({ "question_type": "essay" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let email = create_question(&app, survey_id, "email").await;
    let email_id = email["id"].as_i64().unwrap();

    let response = post_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions/{email_id}/options"),
        json!({ "label": "Nope" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/surveys/{survey_id}/questions/{email_id}"),
        json!({ "label": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json(
        app,
        &format!("/api/v1/surveys/{survey_id}/questions/{email_id}/order"),
        json!({ "new_order": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "ORDER_OUT_OF_RANGE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_option_under_wrong_question_returns_400(pool: PgPool) {
    let app = build_test_app(pool);
    let survey_id = create_survey(&app, "Parents").await;
    let first = create_question(&app, survey_id, "single_choice").await;
    let second = create_question(&app, survey_id, "multi_choice").await;
    let (first_id, second_id) = (first["id"].as_i64().unwrap(), second["id"].as_i64().unwrap());
    let option = create_option(&app, survey_id, first_id, json!({ "label": "A" })).await;
    let option_id = option["id"].as_i64().unwrap();

    let response = patch_json(
        app,
        &format!("/api/v1/surveys/{survey_id}/questions/{second_id}/options/{option_id}"),
        json!({ "label": "B" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_PARENT");
}
