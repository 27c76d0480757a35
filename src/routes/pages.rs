use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tower_sessions::Session;

use crate::auth::CurrentUser;
use crate::dto::{DeveloperView, IndexView, Page, RouteInfo};
use crate::error::AppError;
use crate::services::GameService;
use crate::services::game_service::FEATURED_COUNT;
use crate::state::AppState;

const SITE_ROUTES: &[RouteInfo] = &[
    RouteInfo { method: "GET", path: "/", summary: "Games ranked by rating" },
    RouteInfo { method: "GET", path: "/developer", summary: "This page" },
    RouteInfo { method: "GET", path: "/register", summary: "Sign-up form" },
    RouteInfo { method: "POST", path: "/register", summary: "Create an account" },
    RouteInfo { method: "POST", path: "/register/send_code", summary: "Request a phone verification code" },
    RouteInfo { method: "GET", path: "/login", summary: "Login form" },
    RouteInfo { method: "POST", path: "/login", summary: "Log in with username or phone" },
    RouteInfo { method: "POST", path: "/logout", summary: "Log out" },
    RouteInfo { method: "GET", path: "/games/new", summary: "New game form (admin)" },
    RouteInfo { method: "POST", path: "/games/new", summary: "Publish a game (admin)" },
    RouteInfo { method: "GET", path: "/games/{slug}", summary: "Game details and ratings" },
    RouteInfo { method: "GET", path: "/games/{slug}/play", summary: "Play a game" },
    RouteInfo { method: "POST", path: "/games/{slug}/rate", summary: "Rate a game from 1 to 5" },
    RouteInfo { method: "GET", path: "/history", summary: "Your play history" },
    RouteInfo { method: "GET", path: "/health", summary: "Service health" },
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/developer", get(developer))
}

async fn index(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(viewer): CurrentUser,
) -> Result<Json<Page<IndexView>>, AppError> {
    let games = GameService::list_ranked(&state.db).await?;
    let featured = games.iter().take(FEATURED_COUNT).cloned().collect();

    Page::render(&session, viewer.as_ref(), IndexView { games, featured }).await
}

async fn developer(
    session: Session,
    CurrentUser(viewer): CurrentUser,
) -> Result<Json<Page<DeveloperView>>, AppError> {
    let view = DeveloperView {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        routes: SITE_ROUTES,
    };
    Page::render(&session, viewer.as_ref(), view).await
}
