//! Startup bootstrap: the administrator account and the bundled example games.
//!
//! Every step checks before it writes, so running the seed on every boot is safe.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::entities::{game, user};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PHONE: &str = "13800000000";

struct BundledGame {
    title: &'static str,
    slug: &'static str,
    description: &'static str,
    instructions: &'static str,
    play_markup: &'static str,
    client_script: &'static str,
}

const BUNDLED_GAMES: [BundledGame; 4] = [
    BundledGame {
        title: "Snake Showdown",
        slug: "snake-classic",
        description: "Steer the snake into energy blocks and watch it grow. A test of quick reflexes.",
        instructions: "Use the arrow keys to move and space to restart. Don't bite yourself!",
        play_markup: include_str!("games/snake.html"),
        client_script: include_str!("games/snake.js"),
    },
    BundledGame {
        title: "Angry Birds: Slingshot Challenge",
        slug: "angry-birds",
        description: "Tune the launch angle and power to land the bird on the green pig. Ballistics in action.",
        instructions: "Drag the sliders to set angle and power, then press Launch to knock the target over.",
        play_markup: include_str!("games/angry_birds.html"),
        client_script: include_str!("games/angry_birds.js"),
    },
    BundledGame {
        title: "Tetris: Stacking Master",
        slug: "tetris-classic",
        description: "Stack the falling blocks into full rows and clear them for points.",
        instructions: "Left and right arrows move, down speeds up the drop, space rotates the piece.",
        play_markup: include_str!("games/tetris.html"),
        client_script: include_str!("games/tetris.js"),
    },
    BundledGame {
        title: "Guess the Number",
        slug: "guess-number",
        description: "A secret number between 1 and 100 is waiting. Find it in as few guesses as you can.",
        instructions: "Type a guess and press Enter. The hint tells you whether to go higher or lower.",
        play_markup: include_str!("games/guess_number.html"),
        client_script: include_str!("games/guess_number.js"),
    },
];

/// Ensure the administrator and the bundled games exist.
///
/// # Errors
///
/// Returns an error if a query fails or the admin password cannot be hashed.
pub async fn seed_data(db: &DatabaseConnection, admin_password: &str) -> anyhow::Result<()> {
    ensure_admin(db, admin_password).await?;
    let inserted = ensure_games(db).await?;
    tracing::info!(inserted, "seed data checked");
    Ok(())
}

async fn ensure_admin(db: &DatabaseConnection, admin_password: &str) -> anyhow::Result<()> {
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(ADMIN_USERNAME))
        .one(db)
        .await?;

    match existing {
        Some(admin) if admin.phone_number.is_none() => {
            let phone_taken = user::Entity::find()
                .filter(user::Column::PhoneNumber.eq(ADMIN_PHONE))
                .one(db)
                .await?
                .is_some();
            if phone_taken {
                tracing::warn!("admin phone number already belongs to another account");
                return Ok(());
            }

            let mut active = admin.into_active_model();
            active.phone_number = Set(Some(ADMIN_PHONE.to_string()));
            active.update(db).await?;
            tracing::info!("admin phone number backfilled");
        }
        Some(_) => {}
        None => {
            let password_hash = hash_password(admin_password)?;
            user::ActiveModel {
                id: Set(Uuid::new_v4()),
                username: Set(ADMIN_USERNAME.to_string()),
                email: Set(ADMIN_EMAIL.to_string()),
                phone_number: Set(Some(ADMIN_PHONE.to_string())),
                password_hash: Set(password_hash),
                is_admin: Set(true),
                created_at: Set(Utc::now().fixed_offset()),
            }
            .insert(db)
            .await?;
            tracing::info!(username = ADMIN_USERNAME, "admin account created");
        }
    }

    Ok(())
}

async fn ensure_games(db: &DatabaseConnection) -> anyhow::Result<usize> {
    let mut inserted = 0;
    for bundled in &BUNDLED_GAMES {
        let present = game::Entity::find()
            .filter(game::Column::Slug.eq(bundled.slug))
            .one(db)
            .await?
            .is_some();
        if present {
            continue;
        }

        game::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(bundled.title.to_string()),
            slug: Set(bundled.slug.to_string()),
            description: Set(bundled.description.to_string()),
            instructions: Set(bundled.instructions.to_string()),
            play_markup: Set(bundled.play_markup.to_string()),
            client_script: Set(bundled.client_script.to_string()),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(db)
        .await?;
        inserted += 1;
    }
    Ok(inserted)
}
