use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use tower_sessions::Session;

use crate::auth::{AdminUser, AuthUser, CurrentUser};
use crate::dto::{
    GameDetailView, GameFormValues, GameResponse, GameView, Page, PlayView, RateForm,
};
use crate::error::AppError;
use crate::flash::{FlashCategory, Flashes};
use crate::services::{GameService, NewGame, PlayService, RatingService};
use crate::state::AppState;

/// Game router. `/games/new` is matched before the `{slug}` routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/games/new", get(new_game_page).post(create_game))
        .route("/games/{slug}", get(game_detail))
        .route("/games/{slug}/play", get(play_game))
        .route("/games/{slug}/rate", post(rate_game))
}

/// Location of a game's detail page. Slugs may hold CJK characters, which a
/// `Location` header cannot carry raw.
fn detail_location(slug: &str) -> String {
    format!("/games/{}", urlencoding::encode(slug))
}

// ============================================================================
// Publishing (admin)
// ============================================================================

async fn new_game_page(
    session: Session,
    AdminUser(admin): AdminUser,
) -> Result<Json<Page<GameView>>, AppError> {
    let view = GameView {
        form: GameFormValues::default(),
    };
    Page::render(&session, Some(&admin), view).await
}

async fn create_game(
    State(state): State<AppState>,
    session: Session,
    AdminUser(admin): AdminUser,
    Form(input): Form<NewGame>,
) -> Result<Response, AppError> {
    let flashes = Flashes::new(&session);
    let form = GameFormValues::from(&input);

    match GameService::create(&state.db, input).await {
        Ok(created) => {
            tracing::info!(admin_id = %admin.id, slug = %created.slug, "game published");
            flashes
                .push(FlashCategory::Success, "Game published successfully!")
                .await?;
            Ok(Redirect::to(&detail_location(&created.slug)).into_response())
        }
        Err(AppError::BadRequest(message) | AppError::Conflict(message)) => {
            flashes.push(FlashCategory::Danger, message).await?;
            Ok(Page::render(&session, Some(&admin), GameView { form })
                .await?
                .into_response())
        }
        Err(err) => Err(err),
    }
}

// ============================================================================
// Viewing, playing, rating
// ============================================================================

async fn game_detail(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(viewer): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<Page<GameDetailView>>, AppError> {
    let found = GameService::find_by_slug(&state.db, &slug).await?;
    let summary = GameService::rating_summary(&state.db, found.id).await?;

    let user_rating = match &viewer {
        Some(u) => RatingService::find(&state.db, u.id, found.id)
            .await?
            .map(|r| r.score),
        None => None,
    };

    let view = GameDetailView {
        game: GameResponse::from(&found),
        average_rating: summary.average,
        rating_count: summary.count,
        user_rating,
    };
    Page::render(&session, viewer.as_ref(), view).await
}

async fn play_game(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<Page<PlayView>>, AppError> {
    let found = GameService::find_by_slug(&state.db, &slug).await?;
    PlayService::record_play(&state.db, user.id, found.id).await?;

    Page::render(&session, Some(&user), PlayView::from(found)).await
}

async fn rate_game(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    Form(input): Form<RateForm>,
) -> Result<Redirect, AppError> {
    let found = GameService::find_by_slug(&state.db, &slug).await?;
    let score = RatingService::parse_score(input.score.as_deref());
    let flashes = Flashes::new(&session);

    match RatingService::rate(&state.db, user.id, found.id, score).await {
        Ok(_) => {
            flashes
                .push(FlashCategory::Success, "Thanks for rating!")
                .await?;
        }
        Err(AppError::BadRequest(message)) => {
            tracing::debug!(user_id = %user.id, slug = %found.slug, score, "rating rejected");
            flashes.push(FlashCategory::Danger, message).await?;
        }
        Err(err) => return Err(err),
    }

    Ok(Redirect::to(&detail_location(&found.slug)))
}
