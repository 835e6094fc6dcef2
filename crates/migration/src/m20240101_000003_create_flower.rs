//! Create `flower` table, managed by Service A's admin directly.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Flower::Table)
                    .if_not_exists()
                    .col(pk_auto(Flower::Id))
                    .col(string_len(Flower::Title, 256).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Flower::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Flower { Table, Id, Title }
