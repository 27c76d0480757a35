pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_user_table;
mod m20260301_000002_create_game_table;
mod m20260301_000003_create_play_history_table;
mod m20260301_000004_create_rating_table;
mod m20260301_000005_create_phone_verification_table;
mod m20260315_000001_add_user_phone_column;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_user_table::Migration),
            Box::new(m20260301_000002_create_game_table::Migration),
            Box::new(m20260301_000003_create_play_history_table::Migration),
            Box::new(m20260301_000004_create_rating_table::Migration),
            Box::new(m20260301_000005_create_phone_verification_table::Migration),
            Box::new(m20260315_000001_add_user_phone_column::Migration),
        ]
    }
}
