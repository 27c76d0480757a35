use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use tower_sessions::Session;

use crate::auth::{AuthSession, AuthUser, CurrentUser};
use crate::dto::{
    LoginForm, LoginView, Page, RegisterFormValues, RegisterView, SendCodeRequest,
    SendCodeResponse,
};
use crate::error::AppError;
use crate::flash::{FlashCategory, Flashes};
use crate::services::{Registration, UserService, VerificationService};
use crate::state::AppState;

/// Account router: sign-up, phone codes, login and logout.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/register/send_code", post(send_code))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

// ============================================================================
// Registration
// ============================================================================

async fn register_page(
    session: Session,
    CurrentUser(viewer): CurrentUser,
) -> Result<Response, AppError> {
    if viewer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let view = RegisterView {
        form: RegisterFormValues::default(),
    };
    Ok(Page::render(&session, None, view).await?.into_response())
}

async fn register(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(viewer): CurrentUser,
    Form(input): Form<Registration>,
) -> Result<Response, AppError> {
    if viewer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let flashes = Flashes::new(&session);
    let form = RegisterFormValues::from(&input);

    match UserService::register(&state.db, input).await {
        Ok(_) => {
            flashes
                .push(
                    FlashCategory::Success,
                    "Registration successful, please log in to start playing!",
                )
                .await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(AppError::BadRequest(message) | AppError::Conflict(message)) => {
            flashes.push(FlashCategory::Danger, message).await?;
            Ok(Page::render(&session, None, RegisterView { form })
                .await?
                .into_response())
        }
        Err(err) => Err(err),
    }
}

/// Demo-only: the code is returned in the response body instead of by SMS.
async fn send_code(
    State(state): State<AppState>,
    payload: Result<Json<SendCodeRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = payload.map(|Json(body)| body).unwrap_or_default();

    match VerificationService::issue_code(&state.db, &request.phone).await {
        Ok(code) => Ok(Json(SendCodeResponse::sent(code)).into_response()),
        Err(AppError::BadRequest(message)) => Ok((
            StatusCode::BAD_REQUEST,
            Json(SendCodeResponse::rejected(message)),
        )
            .into_response()),
        Err(err) => Err(err),
    }
}

// ============================================================================
// Login / Logout
// ============================================================================

async fn login_page(
    session: Session,
    CurrentUser(viewer): CurrentUser,
) -> Result<Response, AppError> {
    if viewer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let view = LoginView {
        username: String::new(),
    };
    Ok(Page::render(&session, None, view).await?.into_response())
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(viewer): CurrentUser,
    Form(input): Form<LoginForm>,
) -> Result<Response, AppError> {
    if viewer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    match UserService::authenticate(&state.db, &input.username, &input.password).await {
        Ok(account) => {
            AuthSession::new(&session).login(account.id).await?;
            tracing::info!(user_id = %account.id, username = %account.username, "user logged in");
            Flashes::new(&session)
                .push(FlashCategory::Success, "Welcome back, gamer!")
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::Unauthorized(message)) => {
            Flashes::new(&session)
                .push(FlashCategory::Danger, message)
                .await?;
            let view = LoginView {
                username: input.username.trim().to_string(),
            };
            Ok(Page::render(&session, None, view).await?.into_response())
        }
        Err(err) => Err(err),
    }
}

async fn logout(session: Session, AuthUser(user): AuthUser) -> Result<Redirect, AppError> {
    AuthSession::new(&session).logout().await?;
    tracing::info!(user_id = %user.id, "user logged out");
    Flashes::new(&session)
        .push(FlashCategory::Info, "You have been logged out.")
        .await?;
    Ok(Redirect::to("/"))
}
