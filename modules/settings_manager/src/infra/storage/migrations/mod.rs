//! Database migrations for settings manager

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250908_000001_create_settings::Migration)]
    }
}

mod m20250908_000001_create_settings {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Settings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Settings::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Settings::Bag).big_integer().null())
                        .col(ColumnDef::new(Settings::Group).string().null())
                        .col(ColumnDef::new(Settings::Key).string().not_null())
                        // Enum kept as a short string for SQLite/Postgres portability
                        .col(ColumnDef::new(Settings::Type).string_len(16).not_null())
                        .col(ColumnDef::new(Settings::Value).text().null())
                        .col(
                            ColumnDef::new(Settings::Cache)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Settings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Settings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            // Create indexes
            manager
                .create_index(
                    Index::create()
                        .name("idx_settings_bag")
                        .table(Settings::Table)
                        .col(Settings::Bag)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_settings_group")
                        .table(Settings::Table)
                        .col(Settings::Group)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_settings_key")
                        .table(Settings::Table)
                        .col(Settings::Key)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Settings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Settings {
        Table,
        Id,
        Bag,
        Group,
        Key,
        Type,
        Value,
        Cache,
        CreatedAt,
        UpdatedAt,
    }
}
