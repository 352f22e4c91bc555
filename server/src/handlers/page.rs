use crate::error::AppError;
use crate::services::leaderboard;
use crate::state::AppState;
use crate::view::{self, Board, PageFilter, PageQuery};
use ntex::http::StatusCode;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn leaderboard_page(
    state: web::types::State<Arc<AppState>>,
    query: web::types::Query<PageQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let search = query.q.unwrap_or_default();

    let mode = match leaderboard::parse_mode_filter(query.mode.as_deref()) {
        Ok(mode) => mode,
        Err(e) => {
            let filter = PageFilter { search, mode: None };
            return html(StatusCode::BAD_REQUEST, Board::Failed(e.to_string()), &filter, &state);
        }
    };
    let filter = PageFilter { search, mode };

    match state
        .run(move |s, _| leaderboard::get_leaderboard(&s.db, mode))
        .await
    {
        Ok(board) => html(StatusCode::OK, Board::Loaded(&board), &filter, &state),
        Err(e @ AppError::StorageUnavailable(_)) => {
            tracing::error!(error = %e, "leaderboard page failed to load");
            html(
                StatusCode::INTERNAL_SERVER_ERROR,
                Board::Failed("Please try again shortly.".into()),
                &filter,
                &state,
            )
        }
        Err(e) => html(StatusCode::BAD_REQUEST, Board::Failed(e.to_string()), &filter, &state),
    }
}

fn html(status: StatusCode, board: Board<'_>, filter: &PageFilter, state: &AppState) -> HttpResponse {
    let page = view::render_page(board, filter, &state.page);
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(page.into_string())
}
