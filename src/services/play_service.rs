use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{game, play_history};
use crate::error::AppError;

/// One line of a user's play history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEntry {
    pub id: Uuid,
    pub played_at: DateTimeWithTimeZone,
    pub game_title: String,
    pub game_slug: String,
}

pub struct PlayService;

impl PlayService {
    /// Append a play to the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn record_play(
        db: &DatabaseConnection,
        user_id: Uuid,
        game_id: Uuid,
    ) -> Result<play_history::Model, AppError> {
        let play = play_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            game_id: Set(game_id),
            played_at: Set(Utc::now().fixed_offset()),
        }
        .insert(db)
        .await?;

        tracing::info!(%user_id, %game_id, "play recorded");
        Ok(play)
    }

    /// A user's plays, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn history(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<Vec<PlayEntry>, AppError> {
        let rows = play_history::Entity::find()
            .filter(play_history::Column::UserId.eq(user_id))
            .order_by_desc(play_history::Column::PlayedAt)
            .find_also_related(game::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(play, game)| {
                game.map(|g| PlayEntry {
                    id: play.id,
                    played_at: play.played_at,
                    game_title: g.title,
                    game_slug: g.slug,
                })
            })
            .collect())
    }
}
