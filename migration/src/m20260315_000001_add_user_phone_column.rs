use sea_orm_migration::prelude::*;

/// Adds the optional, unique `phone_number` column to `user`.
///
/// Databases created before phone sign-in may already carry the column from a
/// manual upgrade, so the column is only added when absent. `SQLite` cannot add
/// a `UNIQUE` column in place, hence the separate unique index.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("user", "phone_number").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(User::Table)
                        .add_column(ColumnDef::new(User::PhoneNumber).string_len(20).null())
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_user_phone_number")
                    .table(User::Table)
                    .col(User::PhoneNumber)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_user_phone_number")
                    .table(User::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(User::Table)
                    .drop_column(User::PhoneNumber)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    PhoneNumber,
}
