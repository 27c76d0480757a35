use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use crate::entities::rating;
use crate::error::AppError;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

pub struct RatingService;

impl RatingService {
    /// Read a submitted score; anything that is not an integer counts as 0 and
    /// is therefore rejected by [`RatingService::rate`].
    pub fn parse_score(raw: Option<&str>) -> i32 {
        raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
    }

    /// Insert or update the caller's rating of a game.
    ///
    /// Re-rating overwrites the score and refreshes `created_at`; the row is never duplicated.
    ///
    /// # Errors
    ///
    /// `BadRequest` when `score` is outside 1-5, in which case nothing is written.
    pub async fn rate(
        db: &DatabaseConnection,
        user_id: Uuid,
        game_id: Uuid,
        score: i32,
    ) -> Result<rating::Model, AppError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(AppError::BadRequest(format!(
                "Ratings range from {MIN_SCORE} to {MAX_SCORE} stars."
            )));
        }

        if let Some(existing) = Self::find(db, user_id, game_id).await? {
            return Self::overwrite(db, existing, score).await;
        }

        let inserted = rating::ActiveModel {
            id: Set(Uuid::new_v4()),
            score: Set(score),
            user_id: Set(user_id),
            game_id: Set(game_id),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(db)
        .await;

        match inserted {
            Ok(model) => {
                tracing::info!(%user_id, %game_id, score, "game rated");
                Ok(model)
            }
            // Lost a race with a concurrent first rating: update that row instead
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = Self::find(db, user_id, game_id)
                    .await?
                    .ok_or_else(|| AppError::Internal(err.into()))?;
                Self::overwrite(db, existing, score).await
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The user's current rating of a game, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find(
        db: &DatabaseConnection,
        user_id: Uuid,
        game_id: Uuid,
    ) -> Result<Option<rating::Model>, AppError> {
        Ok(rating::Entity::find()
            .filter(rating::Column::UserId.eq(user_id))
            .filter(rating::Column::GameId.eq(game_id))
            .one(db)
            .await?)
    }

    async fn overwrite(
        db: &DatabaseConnection,
        existing: rating::Model,
        score: i32,
    ) -> Result<rating::Model, AppError> {
        let mut active: rating::ActiveModel = existing.into();
        active.score = Set(score);
        active.created_at = Set(Utc::now().fixed_offset());
        let model = active.update(db).await?;
        tracing::info!(user_id = %model.user_id, game_id = %model.game_id, score, "rating updated");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::test_db;
    use crate::services::{GameService, NewGame, Registration, UserService};
    use sea_orm::PaginatorTrait;

    async fn fixture(db: &DatabaseConnection) -> (Uuid, Uuid) {
        let user_id = UserService::register(
            db,
            Registration {
                username: "rater".to_string(),
                email: "rater@example.com".to_string(),
                password: "pw".to_string(),
                confirm_password: "pw".to_string(),
                ..Registration::default()
            },
        )
        .await
        .map(|u| u.id)
        .unwrap_or_default();

        let game_id = GameService::create(
            db,
            NewGame {
                title: "Guess the Number".to_string(),
                description: "d".to_string(),
                instructions: "i".to_string(),
                play_markup: "<div></div>".to_string(),
                client_script: "void 0;".to_string(),
                ..NewGame::default()
            },
        )
        .await
        .map(|g| g.id)
        .unwrap_or_default();

        (user_id, game_id)
    }

    #[test]
    fn parse_score_defaults_to_zero() {
        assert_eq!(RatingService::parse_score(Some("4")), 4);
        assert_eq!(RatingService::parse_score(Some(" 5 ")), 5);
        assert_eq!(RatingService::parse_score(Some("five")), 0);
        assert_eq!(RatingService::parse_score(Some("")), 0);
        assert_eq!(RatingService::parse_score(None), 0);
    }

    #[tokio::test]
    async fn rerating_updates_in_place() {
        let db = test_db().await;
        let (user_id, game_id) = fixture(&db).await;

        let first = RatingService::rate(&db, user_id, game_id, 2).await;
        let first_id = first.map(|r| r.id).unwrap_or_default();
        let second = RatingService::rate(&db, user_id, game_id, 5).await;
        assert!(second.is_ok_and(|r| r.id == first_id && r.score == 5));

        let rows = rating::Entity::find().count(&db).await.unwrap_or_default();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn out_of_range_scores_leave_existing_rating_untouched() {
        let db = test_db().await;
        let (user_id, game_id) = fixture(&db).await;
        assert!(RatingService::rate(&db, user_id, game_id, 3).await.is_ok());

        for bad in [0, 6, -1, 100] {
            assert!(matches!(
                RatingService::rate(&db, user_id, game_id, bad).await,
                Err(AppError::BadRequest(_))
            ));
        }

        let current = RatingService::find(&db, user_id, game_id).await.ok().flatten();
        assert_eq!(current.map(|r| r.score), Some(3));
    }

    #[tokio::test]
    async fn out_of_range_first_rating_writes_nothing() {
        let db = test_db().await;
        let (user_id, game_id) = fixture(&db).await;
        assert!(RatingService::rate(&db, user_id, game_id, 0).await.is_err());

        let rows = rating::Entity::find().count(&db).await.unwrap_or_default();
        assert_eq!(rows, 0);
    }
}
