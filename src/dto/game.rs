use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::game;
use crate::services::{NewGame, PlayEntry, RankedGame};

/// Game metadata without the playable payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub instructions: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<&game::Model> for GameResponse {
    fn from(g: &game::Model) -> Self {
        Self {
            id: g.id,
            title: g.title.clone(),
            slug: g.slug.clone(),
            description: g.description.clone(),
            instructions: g.instructions.clone(),
            created_at: g.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexView {
    pub games: Vec<RankedGame>,
    pub featured: Vec<RankedGame>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetailView {
    pub game: GameResponse,
    pub average_rating: f64,
    pub rating_count: i64,
    /// The viewer's own score, when logged in and already rated.
    pub user_rating: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayView {
    pub game: GameResponse,
    pub play_markup: String,
    pub client_script: String,
}

impl From<game::Model> for PlayView {
    fn from(g: game::Model) -> Self {
        Self {
            game: GameResponse::from(&g),
            play_markup: g.play_markup,
            client_script: g.client_script,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub plays: Vec<PlayEntry>,
}

/// New-game values echoed back when the form is re-rendered.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFormValues {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub instructions: String,
    pub play_markup: String,
    pub client_script: String,
}

impl From<&NewGame> for GameFormValues {
    fn from(g: &NewGame) -> Self {
        Self {
            title: g.title.trim().to_string(),
            slug: g.slug.trim().to_string(),
            description: g.description.trim().to_string(),
            instructions: g.instructions.trim().to_string(),
            play_markup: g.play_markup.trim().to_string(),
            client_script: g.client_script.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameView {
    pub form: GameFormValues,
}

/// `POST /games/{slug}/rate` form. Kept as text so a non-numeric score reaches
/// the range check instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RateForm {
    pub score: Option<String>,
}

// ============ Developer page ============

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DeveloperView {
    pub name: &'static str,
    pub version: &'static str,
    pub routes: &'static [RouteInfo],
}
