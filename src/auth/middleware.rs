use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use sea_orm::EntityTrait;
use tower_sessions::Session;

use crate::auth::session::AuthSession;
use crate::entities::user;
use crate::error::AppError;
use crate::flash::{FlashCategory, Flashes};
use crate::state::AppState;

/// Resolve the user recorded in the request's session.
///
/// A session pointing at a user that no longer exists counts as anonymous.
async fn session_user(parts: &mut Parts, state: &AppState) -> Result<Option<user::Model>, AppError> {
    let session = session_from_parts(parts, state).await?;
    let Some(user_id) = AuthSession::new(&session).user_id().await? else {
        return Ok(None);
    };

    Ok(user::Entity::find_by_id(user_id).one(&state.db).await?)
}

async fn session_from_parts(parts: &mut Parts, state: &AppState) -> Result<Session, AppError> {
    Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))
}

/// The logged-in user, required.
///
/// Anonymous requests get an info flash and a redirect to `/login`:
/// ```ignore
/// async fn handler(AuthUser(user): AuthUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user_model) = session_user(parts, state).await? {
            return Ok(Self(user_model));
        }

        tracing::debug!(uri = %parts.uri, "anonymous request to a login-only route");
        let session = session_from_parts(parts, state).await?;
        Flashes::new(&session)
            .push(FlashCategory::Info, "Please log in to access this page.")
            .await?;
        Err(AppError::LoginRequired)
    }
}

/// The logged-in user, if there is one.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<user::Model>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts, state).await?))
    }
}

/// The logged-in user, required to be an administrator.
///
/// Anonymous requests are handled like [`AuthUser`]; other users get a
/// warning flash and are sent back to the home page.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_model) = AuthUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        if user_model.is_admin {
            return Ok(Self(user_model));
        }

        tracing::warn!(user_id = %user_model.id, uri = %parts.uri, "admin route refused");
        let session = session_from_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Flashes::new(&session)
            .push(
                FlashCategory::Warning,
                "Only administrators can publish new games.",
            )
            .await
            .map_err(IntoResponse::into_response)?;
        Err(Redirect::to("/").into_response())
    }
}
