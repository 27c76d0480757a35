use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::password;
use crate::entities::user;
use crate::error::AppError;
use crate::services::VerificationService;
use crate::utils::{is_valid_phone, normalize_phone};

const LOGIN_FAILED: &str = "Login failed, please check your username or password.";
const ACCOUNT_TAKEN: &str = "Username, email or phone number is already in use.";

/// Raw sign-up form values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    /// Optional; any formatting is stripped before validation.
    pub phone: String,
    pub verification_code: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct UserService;

impl UserService {
    /// Create an account.
    ///
    /// The very first account becomes an administrator. When a phone number is
    /// given, the matching verification code is consumed in the same transaction
    /// as the user insert.
    ///
    /// # Errors
    ///
    /// `BadRequest` for missing or malformed fields and bad verification codes,
    /// `Conflict` when the username, email or phone is taken.
    pub async fn register(
        db: &DatabaseConnection,
        input: Registration,
    ) -> Result<user::Model, AppError> {
        let username = input.username.trim();
        let email = input.email.trim();
        let phone = normalize_phone(&input.phone);
        let verification_code = input.verification_code.trim();

        if username.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AppError::BadRequest(
                "Please fill in all registration fields.".to_string(),
            ));
        }
        password::validate_email(email).map_err(AppError::BadRequest)?;
        if !phone.is_empty() && !is_valid_phone(&phone) {
            return Err(AppError::BadRequest(
                "Please enter a valid 11-digit mainland China mobile number.".to_string(),
            ));
        }
        if input.password != input.confirm_password {
            return Err(AppError::BadRequest(
                "The two passwords do not match.".to_string(),
            ));
        }

        let taken = user::Entity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(username))
                    .add(user::Column::Email.eq(email))
                    .add_option(
                        (!phone.is_empty()).then(|| user::Column::PhoneNumber.eq(phone.as_str())),
                    ),
            )
            .one(db)
            .await?;
        if taken.is_some() {
            tracing::debug!(username, "registration rejected: account details taken");
            return Err(AppError::Conflict(ACCOUNT_TAKEN.to_string()));
        }

        let password_hash = password::hash_password(&input.password)?;
        let now = Utc::now().fixed_offset();

        let txn = db.begin().await?;

        let verification = if phone.is_empty() {
            None
        } else {
            let record =
                VerificationService::find_valid(&txn, &phone, verification_code, now).await?;
            if record.is_none() {
                return Err(AppError::BadRequest(
                    "The verification code is invalid or has expired, please request a new one."
                        .to_string(),
                ));
            }
            record
        };

        let is_admin = user::Entity::find().count(&txn).await? == 0;

        let new_user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            phone_number: Set((!phone.is_empty()).then_some(phone)),
            password_hash: Set(password_hash),
            is_admin: Set(is_admin),
            created_at: Set(now),
        };
        let user_model = new_user.insert(&txn).await.map_err(conflict_on_unique)?;

        if let Some(record) = verification {
            VerificationService::consume(&txn, record).await?;
        }

        txn.commit().await?;

        tracing::info!(
            user_id = %user_model.id,
            username = %user_model.username,
            is_admin = user_model.is_admin,
            "user registered"
        );
        Ok(user_model)
    }

    /// Check credentials. `account` is a username or a phone number.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when no account matches or the password is wrong.
    pub async fn authenticate(
        db: &DatabaseConnection,
        account: &str,
        secret: &str,
    ) -> Result<user::Model, AppError> {
        let account = account.trim();
        if account.is_empty() || secret.is_empty() {
            return Err(AppError::Unauthorized(LOGIN_FAILED.to_string()));
        }

        let mut found = user::Entity::find()
            .filter(user::Column::Username.eq(account))
            .one(db)
            .await?;

        if found.is_none() {
            let phone = normalize_phone(account);
            if is_valid_phone(&phone) {
                found = user::Entity::find()
                    .filter(user::Column::PhoneNumber.eq(phone))
                    .one(db)
                    .await?;
            }
        }

        let Some(user_model) = found else {
            tracing::debug!(account, "login rejected: unknown account");
            return Err(AppError::Unauthorized(LOGIN_FAILED.to_string()));
        };

        if !password::verify_password(secret, &user_model.password_hash)? {
            tracing::debug!(user_id = %user_model.id, "login rejected: wrong password");
            return Err(AppError::Unauthorized(LOGIN_FAILED.to_string()));
        }

        Ok(user_model)
    }
}

/// Two concurrent sign-ups can both pass the lookup; the unique indexes decide.
fn conflict_on_unique(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(ACCOUNT_TAKEN.to_string()),
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::phone_verification;
    use crate::services::test_support::test_db;

    fn registration(username: &str, email: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret-pass".to_string(),
            confirm_password: "secret-pass".to_string(),
            ..Registration::default()
        }
    }

    #[tokio::test]
    async fn first_user_becomes_admin_later_users_do_not() {
        let db = test_db().await;

        let first = UserService::register(&db, registration("alice", "alice@example.com")).await;
        assert!(first.as_ref().is_ok_and(|u| u.is_admin));

        let second = UserService::register(&db, registration("bob", "bob@example.com")).await;
        assert!(second.as_ref().is_ok_and(|u| !u.is_admin));
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let db = test_db().await;
        let mut input = registration("alice", "alice@example.com");
        input.password = String::new();
        input.confirm_password = String::new();

        assert!(matches!(
            UserService::register(&db, input).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn password_mismatch_is_rejected() {
        let db = test_db().await;
        let mut input = registration("alice", "alice@example.com");
        input.confirm_password = "something-else".to_string();

        assert!(matches!(
            UserService::register(&db, input).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_rejected() {
        let db = test_db().await;
        assert!(
            UserService::register(&db, registration("alice", "alice@example.com"))
                .await
                .is_ok()
        );

        assert!(matches!(
            UserService::register(&db, registration("alice", "other@example.com")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            UserService::register(&db, registration("other", "alice@example.com")).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn phone_registration_consumes_code_and_rejects_duplicates() {
        let db = test_db().await;
        let code = VerificationService::issue_code(&db, "13700000001")
            .await
            .unwrap_or_default();

        let mut input = registration("alice", "alice@example.com");
        input.phone = "137 0000 0001".to_string();
        input.verification_code = code.clone();
        let user = UserService::register(&db, input).await;
        assert!(
            user.as_ref()
                .is_ok_and(|u| u.phone_number.as_deref() == Some("13700000001"))
        );
        let leftover = phone_verification::Entity::find()
            .filter(phone_verification::Column::PhoneNumber.eq("13700000001"))
            .count(&db)
            .await
            .unwrap_or(u64::MAX);
        assert_eq!(leftover, 0, "the used code must be deleted");

        // Same phone, fresh code: the phone is already taken
        let code = VerificationService::issue_code(&db, "13700000001")
            .await
            .unwrap_or_default();
        let mut input = registration("bob", "bob@example.com");
        input.phone = "13700000001".to_string();
        input.verification_code = code;
        assert!(matches!(
            UserService::register(&db, input).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn phone_registration_requires_matching_code() {
        let db = test_db().await;
        let code = VerificationService::issue_code(&db, "13700000002")
            .await
            .unwrap_or_default();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        let mut input = registration("alice", "alice@example.com");
        input.phone = "13700000002".to_string();
        input.verification_code = wrong.to_string();
        assert!(matches!(
            UserService::register(&db, input).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn phone_registration_rejects_expired_code() {
        let db = test_db().await;
        let issued = phone_verification::ActiveModel {
            id: Set(Uuid::new_v4()),
            phone_number: Set("13700000004".to_string()),
            code: Set("424242".to_string()),
            created_at: Set((Utc::now() - chrono::Duration::minutes(11)).fixed_offset()),
        }
        .insert(&db)
        .await;
        assert!(issued.is_ok());

        let mut input = registration("dave", "dave@example.com");
        input.phone = "13700000004".to_string();
        input.verification_code = "424242".to_string();
        assert!(matches!(
            UserService::register(&db, input).await,
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(user::Entity::find().count(&db).await.unwrap_or(u64::MAX), 0);
    }

    #[tokio::test]
    async fn authenticate_by_username_or_phone() {
        let db = test_db().await;
        let code = VerificationService::issue_code(&db, "13700000003")
            .await
            .unwrap_or_default();
        let mut input = registration("carol", "carol@example.com");
        input.phone = "13700000003".to_string();
        input.verification_code = code;
        assert!(UserService::register(&db, input).await.is_ok());

        assert!(
            UserService::authenticate(&db, "carol", "secret-pass")
                .await
                .is_ok()
        );
        assert!(
            UserService::authenticate(&db, "137-0000-0003", "secret-pass")
                .await
                .is_ok_and(|u| u.username == "carol")
        );
        assert!(matches!(
            UserService::authenticate(&db, "carol", "wrong-pass").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            UserService::authenticate(&db, "nobody", "secret-pass").await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
