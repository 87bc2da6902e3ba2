pub mod health;
pub mod survey;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /surveys                                                  create
/// /surveys/{id}                                             get, rename draft
/// /surveys/{id}/draft                                       editor view
/// /surveys/{id}/published                                   published view
/// /surveys/{id}/publish                                     publish (POST)
/// /surveys/{id}/restore                                     restore all (PUT)
///
/// /surveys/{id}/questions                                   create
/// /surveys/{id}/questions/{qid}                             relabel, delete
/// /surveys/{id}/questions/{qid}/type                        change type
/// /surveys/{id}/questions/{qid}/order                       move
/// /surveys/{id}/questions/{qid}/extra-params                patch extra params
/// /surveys/{id}/questions/{qid}/restore                     restore (PUT)
///
/// /surveys/{id}/questions/{qid}/options                     create
/// /surveys/{id}/questions/{qid}/options/{oid}               relabel, delete
/// /surveys/{id}/questions/{qid}/options/{oid}/order         move
/// /surveys/{id}/questions/{qid}/options/{oid}/restore       restore (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/surveys", survey::router())
}
