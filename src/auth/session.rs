use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;

const SESSION_AUTH_USER_ID: &str = "auth:user";

/// Authentication state kept in the session: the logged-in user's id.
pub struct AuthSession<'a> {
    session: &'a Session,
}

impl<'a> AuthSession<'a> {
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Mark the session as belonging to `user_id`.
    ///
    /// The session id is rotated first so a pre-login cookie cannot be reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn login(&self, user_id: Uuid) -> Result<(), AppError> {
        self.session.cycle_id().await?;
        self.session.insert(SESSION_AUTH_USER_ID, user_id).await?;
        Ok(())
    }

    /// The logged-in user's id, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn user_id(&self) -> Result<Option<Uuid>, AppError> {
        Ok(self.session.get::<Uuid>(SESSION_AUTH_USER_ID).await?)
    }

    /// Forget the logged-in user while keeping the session itself, so a
    /// farewell flash can still be delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.session.remove::<Uuid>(SESSION_AUTH_USER_ID).await?;
        self.session.cycle_id().await?;
        Ok(())
    }
}
