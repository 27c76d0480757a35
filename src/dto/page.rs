use axum::Json;
use chrono::Datelike;
use serde::Serialize;
use tower_sessions::Session;

use crate::dto::UserResponse;
use crate::entities::user;
use crate::error::AppError;
use crate::flash::{Flash, Flashes};

/// Envelope shared by every rendered page.
///
/// Rendering drains the session's flash queue, so each message is shown once.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub flash: Vec<Flash>,
    pub current_user: Option<UserResponse>,
    pub current_year: i32,
    #[serde(flatten)]
    pub view: T,
}

impl<T: Serialize> Page<T> {
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn render(
        session: &Session,
        current_user: Option<&user::Model>,
        view: T,
    ) -> Result<Json<Self>, AppError> {
        Ok(Json(Self {
            flash: Flashes::new(session).take().await?,
            current_user: current_user.map(UserResponse::from),
            current_year: chrono::Utc::now().year(),
            view,
        }))
    }
}
