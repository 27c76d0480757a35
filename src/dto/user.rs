use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user;
use crate::services::Registration;

/// Public view of an account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<&user::Model> for UserResponse {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            phone: u.phone_number.clone(),
            is_admin: u.is_admin,
            created_at: u.created_at,
        }
    }
}

/// Sign-up values echoed back when the form is re-rendered. Passwords and the
/// verification code are never echoed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFormValues {
    pub username: String,
    pub email: String,
    pub phone: String,
}

impl From<&Registration> for RegisterFormValues {
    fn from(r: &Registration) -> Self {
        Self {
            username: r.username.trim().to_string(),
            email: r.email.trim().to_string(),
            phone: r.phone.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterView {
    pub form: RegisterFormValues,
}

/// `POST /login` form. `username` also accepts a phone number.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginView {
    pub username: String,
}

// ============ Phone verification ============

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendCodeRequest {
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl SendCodeResponse {
    pub fn sent(code: String) -> Self {
        Self {
            ok: true,
            message: "Verification code sent (demo mode: use the code below).".to_string(),
            code: Some(code),
        }
    }

    pub const fn rejected(message: String) -> Self {
        Self {
            ok: false,
            message,
            code: None,
        }
    }
}
