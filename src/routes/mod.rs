mod auth;
mod games;
mod health;
mod history;
mod pages;

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{Config, Environment};
use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /`, `GET /developer`: public pages
/// - `/register`, `/register/send_code`, `/login`, `/logout`: accounts
/// - `/games/new`, `/games/{slug}`, `/games/{slug}/play`, `/games/{slug}/rate`: games
/// - `GET /history`: the visitor's plays
/// - `GET /health`: liveness and database check
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(pages::router())
        .merge(auth::router())
        .merge(games::router())
        .merge(history::router())
        .merge(health::router())
}

/// The router with session handling and state attached, ready to serve.
pub fn app(state: AppState) -> Router {
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.secure_cookies())
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            state.config.session_ttl_hours,
        )));

    router().layer(sessions).with_state(state)
}

/// CORS policy. Production admits only `site_url`, with credentials; other
/// environments are permissive.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.environment != Environment::Production {
        return CorsLayer::permissive();
    }

    let origin = config.site_url.parse::<HeaderValue>().unwrap_or_else(|_| {
        tracing::warn!(site_url = %config.site_url, "SITE_URL is not a valid origin");
        HeaderValue::from_static("http://localhost:3000")
    });

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
