use sea_orm_migration::prelude::*;

/// Creates the append-only `play_history` log.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlayHistory::UserId).uuid().not_null())
                    .col(ColumnDef::new(PlayHistory::GameId).uuid().not_null())
                    .col(
                        ColumnDef::new(PlayHistory::PlayedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_play_history_user_id")
                            .from(PlayHistory::Table, PlayHistory::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_play_history_game_id")
                            .from(PlayHistory::Table, PlayHistory::GameId)
                            .to(Game::Table, Game::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // History pages read one user's plays newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_play_history_user_played_at")
                    .table(PlayHistory::Table)
                    .col(PlayHistory::UserId)
                    .col(PlayHistory::PlayedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PlayHistory {
    Table,
    Id,
    UserId,
    GameId,
    PlayedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Game {
    Table,
    Id,
}
