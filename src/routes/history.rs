use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tower_sessions::Session;

use crate::auth::AuthUser;
use crate::dto::{HistoryView, Page};
use crate::error::AppError;
use crate::services::PlayService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/history", get(history))
}

async fn history(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
) -> Result<Json<Page<HistoryView>>, AppError> {
    let plays = PlayService::history(&state.db, user.id).await?;
    Page::render(&session, Some(&user), HistoryView { plays }).await
}
