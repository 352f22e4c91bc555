use crate::error::AppError;
use crate::models::leaderboard::LeaderboardQuery;
use crate::models::test_result::LookupResult;
use crate::services::{ingest, leaderboard, store};
use crate::state::AppState;
use ntex::http::header;
use ntex::util::Bytes;
use ntex::web::{self, HttpRequest, HttpResponse};
use std::sync::Arc;

pub async fn list_tests(
    state: web::types::State<Arc<AppState>>,
    query: web::types::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let mode = leaderboard::parse_mode_filter(query.mode.as_deref())?;
    let board = state
        .run(move |s, _| leaderboard::get_leaderboard(&s.db, mode))
        .await?;
    Ok(HttpResponse::Ok().json(&board))
}

pub async fn get_test(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (username, mode) = path.into_inner();
    let Some(mode) = leaderboard::parse_mode_filter(Some(mode.as_str()))? else {
        return Err(AppError::bad_field("mode", "mode is required"));
    };
    let test = state
        .run(move |s, _| Ok(store::find_one(&s.db, &username, mode)?))
        .await?;
    Ok(HttpResponse::Ok().json(&LookupResult { test }))
}

pub async fn submit_test(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    ingest::authorize(auth, state.bot_api_key.as_deref())?;

    let body: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidPayload(format!("body is not valid JSON: {e}")))?;
    let result = state
        .run(move |s, ticket| ingest::submit_test(&s.db, &body, ticket))
        .await?;

    if result.created {
        Ok(HttpResponse::Created().json(&result))
    } else {
        Ok(HttpResponse::Ok().json(&result))
    }
}
