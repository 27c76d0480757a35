use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::phone_verification;
use crate::error::AppError;
use crate::utils::{generate_verification_code, is_valid_phone, normalize_phone};

/// How long an issued code stays usable.
pub const CODE_TTL_MINUTES: i64 = 10;

pub struct VerificationService;

impl VerificationService {
    /// Issue a new code for `raw_phone` and return it.
    ///
    /// Codes are handed straight back to the caller instead of being sent by SMS;
    /// this is a demo flow only.
    ///
    /// # Errors
    ///
    /// `BadRequest` when the phone is empty or not an 11-digit mobile number.
    pub async fn issue_code(db: &DatabaseConnection, raw_phone: &str) -> Result<String, AppError> {
        let phone = normalize_phone(raw_phone);
        if phone.is_empty() {
            return Err(AppError::BadRequest(
                "Please enter a phone number before requesting a code.".to_string(),
            ));
        }
        if !is_valid_phone(&phone) {
            return Err(AppError::BadRequest(
                "Invalid phone number, please enter an 11-digit number.".to_string(),
            ));
        }

        let code = generate_verification_code();
        phone_verification::ActiveModel {
            id: Set(Uuid::new_v4()),
            phone_number: Set(phone.clone()),
            code: Set(code.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(db)
        .await?;

        tracing::info!(phone = %phone, "issued phone verification code");
        Ok(code)
    }

    /// Latest record for `phone` carrying `code`, provided it is still within its TTL at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_valid<C: ConnectionTrait>(
        db: &C,
        phone: &str,
        code: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<phone_verification::Model>, AppError> {
        let latest = phone_verification::Entity::find()
            .filter(phone_verification::Column::PhoneNumber.eq(phone))
            .filter(phone_verification::Column::Code.eq(code))
            .order_by_desc(phone_verification::Column::CreatedAt)
            .one(db)
            .await?;

        Ok(latest.filter(|record| Self::is_fresh(record.created_at, now)))
    }

    /// Delete a used record so the code cannot be replayed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn consume<C: ConnectionTrait>(
        db: &C,
        record: phone_verification::Model,
    ) -> Result<(), AppError> {
        phone_verification::Entity::delete_by_id(record.id)
            .exec(db)
            .await?;
        Ok(())
    }

    fn is_fresh(created_at: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> bool {
        now.signed_duration_since(created_at) <= chrono::Duration::minutes(CODE_TTL_MINUTES)
    }
}
