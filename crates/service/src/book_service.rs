use sea_orm::{ConnectionTrait, DatabaseConnection, Set};
use tracing::debug;

use models::{author, book};
use crate::crud;
use crate::errors::ServiceError;
use crate::pagination::{ListQuery, Page};
use crate::schemas::{BookCreate, BookResponse, BookUpdate};

async fn ensure_author<C: ConnectionTrait>(db: &C, author_id: i32) -> Result<(), ServiceError> {
    match crud::get_by_id::<author::Entity, C>(db, author_id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::Validation(format!("Author with id={} not found", author_id))),
    }
}

/// List books with pagination and ordering.
pub async fn list(db: &DatabaseConnection, query: &ListQuery) -> Result<Page<BookResponse>, ServiceError> {
    let page = crud::get_multi_with_total::<book::Entity, _>(db, query).await?;
    Ok(page.map(BookResponse::from))
}

/// Get book by id.
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<BookResponse, ServiceError> {
    Ok(crud::get_or_404::<book::Entity, _>(db, id).await?.into())
}

/// Create a book for an existing author.
pub async fn create(db: &DatabaseConnection, input: BookCreate) -> Result<BookResponse, ServiceError> {
    book::validate_title(&input.title)?;
    ensure_author(db, input.author_id).await?;
    let am = book::ActiveModel {
        title: Set(input.title),
        genre: Set(input.genre),
        extra_genre: Set(input.extra_genre),
        author_id: Set(input.author_id),
        ..Default::default()
    };
    let created = crud::create::<book::Entity, _>(db, am).await?;
    debug!(event = "book_created", book_id = created.id);
    Ok(created.into())
}

/// Apply the fields present in `input`.
pub async fn update(db: &DatabaseConnection, id: i32, input: BookUpdate) -> Result<BookResponse, ServiceError> {
    if let Some(title) = input.title.as_deref() { book::validate_title(title)?; }
    if let Some(author_id) = input.author_id { ensure_author(db, author_id).await?; }
    let updated = crud::update::<book::Entity, _, _>(db, id, |am| {
        if let Some(t) = input.title { am.title = Set(t); }
        if let Some(g) = input.genre { am.genre = Set(g); }
        if let Some(eg) = input.extra_genre { am.extra_genre = Set(eg); }
        if let Some(a) = input.author_id { am.author_id = Set(a); }
    })
    .await?;
    Ok(updated.into())
}

/// Delete book.
pub async fn remove(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    crud::remove::<book::Entity, _>(db, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::book::Genre;

    #[tokio::test]
    async fn book_crud_service() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let writer = author::create(&db, "Frank", "Herbert").await?;

        let created = create(&db, BookCreate { title: "Dune".into(), genre: Genre::ScienceFiction, extra_genre: Some(Genre::Fantasy), author_id: writer.id }).await?;
        assert_eq!(get(&db, created.id).await?, created);

        // Only the supplied field changes
        let updated = update(&db, created.id, BookUpdate { title: Some("Dune Messiah".into()), ..Default::default() }).await?;
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.genre, Genre::ScienceFiction);
        assert_eq!(updated.extra_genre, Some(Genre::Fantasy));

        let cleared = update(&db, created.id, BookUpdate { extra_genre: Some(None), ..Default::default() }).await?;
        assert_eq!(cleared.extra_genre, None);
        assert_eq!(cleared.title, "Dune Messiah");

        remove(&db, created.id).await?;
        let err = get(&db, created.id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Book with id={} not found", created.id));
        Ok(())
    }

    #[tokio::test]
    async fn create_requires_existing_author() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let err = create(&db, BookCreate { title: "Orphan".into(), genre: Genre::Fiction, extra_genre: None, author_id: 99 }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn list_returns_total_independent_of_limit() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let writer = author::create(&db, "Mary", "Oliver").await?;
        for i in 0..5 {
            create(&db, BookCreate { title: format!("Poems {i}"), genre: Genre::Poetry, extra_genre: None, author_id: writer.id }).await?;
        }
        let page = list(&db, &ListQuery { skip: Some(3), limit: Some(10), ..Default::default() }).await?;
        assert_eq!(page.total_count, 5);
        assert_eq!(page.objects.len(), 2);
        assert_eq!(page.objects[0].title, "Poems 3");
        Ok(())
    }
}
