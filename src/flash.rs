//! One-shot user notifications carried in the session until the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::AppError;

const SESSION_FLASH: &str = "flash:messages";

/// Visual category of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

/// Flash queue stored in the visitor's session.
pub struct Flashes<'a> {
    session: &'a Session,
}

impl<'a> Flashes<'a> {
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Append a message to the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    pub async fn push(
        &self,
        category: FlashCategory,
        message: impl Into<String>,
    ) -> Result<(), AppError> {
        let mut queued: Vec<Flash> = self.session.get(SESSION_FLASH).await?.unwrap_or_default();
        queued.push(Flash {
            category,
            message: message.into(),
        });
        self.session.insert(SESSION_FLASH, queued).await?;
        Ok(())
    }

    /// Remove and return every queued message, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn take(&self) -> Result<Vec<Flash>, AppError> {
        Ok(self
            .session
            .remove::<Vec<Flash>>(SESSION_FLASH)
            .await?
            .unwrap_or_default())
    }
}
