use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{game, rating};
use crate::error::AppError;
use crate::utils::slugify;

/// Average score with unrated games counting as 0.
///
/// The cast keeps the column a double on both `SQLite` (where `AVG` of nothing
/// coalesces to an integer) and Postgres (where `AVG` of integers is `numeric`).
const AVG_SCORE_SQL: &str = "CAST(COALESCE(AVG(rating.score), 0) AS DOUBLE PRECISION)";
const RATING_COUNT_SQL: &str = "COUNT(rating.id)";

/// How many top-ranked games the home page features.
pub const FEATURED_COUNT: usize = 10;

/// A game row on the home page, with its rating aggregates.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedGame {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
    pub avg_score: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Rounded to two decimals; 0 when nobody has rated the game.
    pub average: f64,
    pub count: i64,
}

/// Values submitted through the new-game form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewGame {
    pub title: String,
    /// Optional; derived from the title when blank.
    pub slug: String,
    pub description: String,
    pub instructions: String,
    pub play_markup: String,
    pub client_script: String,
}

pub struct GameService;

impl GameService {
    /// All games, best average rating first, newest first among equals.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_ranked(db: &DatabaseConnection) -> Result<Vec<RankedGame>, AppError> {
        let games = game::Entity::find()
            .select_only()
            .columns([
                game::Column::Id,
                game::Column::Title,
                game::Column::Slug,
                game::Column::Description,
                game::Column::CreatedAt,
            ])
            .column_as(Expr::cust(AVG_SCORE_SQL), "avg_score")
            .column_as(Expr::cust(RATING_COUNT_SQL), "rating_count")
            .join(JoinType::LeftJoin, game::Relation::Ratings.def())
            .group_by(game::Column::Id)
            .order_by(Expr::cust("avg_score"), Order::Desc)
            .order_by_desc(game::Column::CreatedAt)
            .into_model::<RankedGame>()
            .all(db)
            .await?;

        Ok(games)
    }

    /// # Errors
    ///
    /// `NotFound` when no game has this slug.
    pub async fn find_by_slug(db: &DatabaseConnection, slug: &str) -> Result<game::Model, AppError> {
        game::Entity::find()
            .filter(game::Column::Slug.eq(slug))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))
    }

    /// Average and number of ratings for one game.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn rating_summary(
        db: &DatabaseConnection,
        game_id: Uuid,
    ) -> Result<RatingSummary, AppError> {
        let (average, count): (f64, i64) = rating::Entity::find()
            .select_only()
            .column_as(Expr::cust(AVG_SCORE_SQL), "avg_score")
            .column_as(Expr::cust(RATING_COUNT_SQL), "rating_count")
            .filter(rating::Column::GameId.eq(game_id))
            .into_tuple()
            .one(db)
            .await?
            .unwrap_or((0.0, 0));

        Ok(RatingSummary {
            average: (average * 100.0).round() / 100.0,
            count,
        })
    }

    /// Publish a new game.
    ///
    /// # Errors
    ///
    /// `BadRequest` when a required field is blank, `Conflict` when the slug,
    /// custom or derived, already belongs to another game.
    pub async fn create(db: &DatabaseConnection, input: NewGame) -> Result<game::Model, AppError> {
        let title = input.title.trim();
        let description = input.description.trim();
        let instructions = input.instructions.trim();
        let play_markup = input.play_markup.trim();
        let client_script = input.client_script.trim();

        if [title, description, instructions, play_markup, client_script]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(AppError::BadRequest(
                "Please fill in all game information.".to_string(),
            ));
        }

        let custom_slug = input.slug.trim();
        let (slug, taken_message) = if custom_slug.is_empty() {
            (
                slugify(title),
                "A game with the same link already exists, please use another title.",
            )
        } else {
            (
                custom_slug.to_string(),
                "This custom link already exists, please choose another one.",
            )
        };

        let existing = game::Entity::find()
            .filter(game::Column::Slug.eq(slug.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            tracing::debug!(slug = %slug, "game creation rejected: slug taken");
            return Err(AppError::Conflict(taken_message.to_string()));
        }

        let new_game = game::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            slug: Set(slug),
            description: Set(description.to_string()),
            instructions: Set(instructions.to_string()),
            play_markup: Set(play_markup.to_string()),
            client_script: Set(client_script.to_string()),
            created_at: Set(Utc::now().fixed_offset()),
        };
        let game_model = new_game
            .insert(db)
            .await
            .map_err(|err| conflict_on_unique(err, taken_message))?;

        tracing::info!(game_id = %game_model.id, slug = %game_model.slug, "game published");
        Ok(game_model)
    }
}

fn conflict_on_unique(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(message.to_string()),
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::test_db;
    use crate::services::{RatingService, Registration, UserService};

    fn new_game(title: &str, slug: &str) -> NewGame {
        NewGame {
            title: title.to_string(),
            slug: slug.to_string(),
            description: "A test game".to_string(),
            instructions: "Press any key".to_string(),
            play_markup: "<canvas id=\"c\"></canvas>".to_string(),
            client_script: "console.log('hi');".to_string(),
        }
    }

    async fn user(db: &DatabaseConnection, name: &str) -> Uuid {
        UserService::register(
            db,
            Registration {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password: "pw".to_string(),
                confirm_password: "pw".to_string(),
                ..Registration::default()
            },
        )
        .await
        .map(|u| u.id)
        .unwrap_or_default()
    }

    #[tokio::test]
    async fn create_derives_slug_from_title() {
        let db = test_db().await;
        let created = GameService::create(&db, new_game("Snake Classic", "")).await;
        assert!(created.is_ok_and(|g| g.slug == "snake-classic"));

        let found = GameService::find_by_slug(&db, "snake-classic").await;
        assert!(found.is_ok_and(|g| g.title == "Snake Classic"));
    }

    #[tokio::test]
    async fn create_keeps_custom_slug() {
        let db = test_db().await;
        let created = GameService::create(&db, new_game("Snake Classic", "my-snake")).await;
        assert!(created.is_ok_and(|g| g.slug == "my-snake"));
    }

    #[tokio::test]
    async fn derived_slug_collision_is_rejected_without_overwriting() {
        let db = test_db().await;
        assert!(
            GameService::create(&db, new_game("Snake Classic", ""))
                .await
                .is_ok()
        );

        let mut again = new_game("Snake: Classic!", "");
        again.description = "Should not replace the original".to_string();
        assert!(matches!(
            GameService::create(&db, again).await,
            Err(AppError::Conflict(_))
        ));

        let original = GameService::find_by_slug(&db, "snake-classic").await;
        assert!(original.is_ok_and(|g| g.description == "A test game"));
    }

    #[tokio::test]
    async fn custom_slug_collision_is_rejected() {
        let db = test_db().await;
        assert!(GameService::create(&db, new_game("One", "shared")).await.is_ok());
        assert!(matches!(
            GameService::create(&db, new_game("Two", "shared")).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn blank_required_field_is_rejected() {
        let db = test_db().await;
        let mut input = new_game("Snake", "");
        input.client_script = "   ".to_string();
        assert!(matches!(
            GameService::create(&db, input).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let db = test_db().await;
        assert!(matches!(
            GameService::find_by_slug(&db, "missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_ranks_by_average_then_recency() {
        let db = test_db().await;
        let older = GameService::create(&db, new_game("Older", ""))
            .await
            .map(|g| g.id)
            .unwrap_or_default();
        let rated = GameService::create(&db, new_game("Rated", ""))
            .await
            .map(|g| g.id)
            .unwrap_or_default();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(GameService::create(&db, new_game("Newer", "")).await.is_ok());

        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        assert!(RatingService::rate(&db, alice, rated, 5).await.is_ok());
        assert!(RatingService::rate(&db, bob, rated, 4).await.is_ok());
        assert!(RatingService::rate(&db, alice, older, 1).await.is_ok());

        let ranked = GameService::list_ranked(&db).await.unwrap_or_default();
        let titles: Vec<&str> = ranked.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, ["Rated", "Older", "Newer"]);

        assert!((ranked[0].avg_score - 4.5).abs() < f64::EPSILON);
        assert_eq!(ranked[0].rating_count, 2);
        assert!(ranked[2].avg_score.abs() < f64::EPSILON);
        assert_eq!(ranked[2].rating_count, 0);
    }

    #[tokio::test]
    async fn unrated_games_order_newest_first() {
        let db = test_db().await;
        assert!(GameService::create(&db, new_game("First", "")).await.is_ok());
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(GameService::create(&db, new_game("Second", "")).await.is_ok());

        let ranked = GameService::list_ranked(&db).await.unwrap_or_default();
        let titles: Vec<&str> = ranked.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, ["Second", "First"]);
    }

    #[tokio::test]
    async fn rating_summary_rounds_to_two_decimals() {
        let db = test_db().await;
        let game_id = GameService::create(&db, new_game("Tetris", ""))
            .await
            .map(|g| g.id)
            .unwrap_or_default();

        let empty = GameService::rating_summary(&db, game_id).await;
        assert!(empty.is_ok_and(|s| s.count == 0 && s.average.abs() < f64::EPSILON));

        for (name, score) in [("a", 5), ("b", 4), ("c", 4)] {
            let uid = user(&db, name).await;
            assert!(RatingService::rate(&db, uid, game_id, score).await.is_ok());
        }

        let summary = GameService::rating_summary(&db, game_id).await;
        assert!(summary.is_ok_and(|s| s.count == 3 && (s.average - 4.33).abs() < 1e-9));
    }
}
