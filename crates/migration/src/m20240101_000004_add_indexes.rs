use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Book: lookups and cascades by author
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_book_author")
                    .table(Book::Table)
                    .col(Book::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Author: admin list sorts by last name
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_author_last_name")
                    .table(Author::Table)
                    .col(Author::LastName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_author_last_name").table(Author::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_book_author").table(Book::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Book { Table, AuthorId }

#[derive(DeriveIden)]
enum Author { Table, LastName }
