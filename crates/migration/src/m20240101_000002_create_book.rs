//! Create `book` table.
//! `genre`/`extra_genre` hold the snake_case genre slug; `author_id` cascades on delete.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Book::Table)
                    .if_not_exists()
                    .col(pk_auto(Book::Id))
                    .col(string_len(Book::Title, 256).not_null())
                    .col(string_len(Book::Genre, 32).not_null())
                    .col(string_len_null(Book::ExtraGenre, 32))
                    .col(integer(Book::AuthorId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_author")
                            .from(Book::Table, Book::AuthorId)
                            .to(Author::Table, Author::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Book::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Book {
    Table,
    Id,
    Title,
    Genre,
    ExtraGenre,
    AuthorId,
}

#[derive(DeriveIden)]
enum Author { Table, Id }
