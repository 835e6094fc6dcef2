use crate::db::connect_in_memory;
use crate::errors::ModelError;
use crate::{author, book, flower};
use crate::book::Genre;
use anyhow::Result;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, Set};

#[tokio::test]
async fn test_author_and_book_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = connect_in_memory().await?;

    let writer = author::create(&db, "Ursula", "Le Guin").await?;
    assert!(writer.id > 0);

    let novel = book::create(&db, "The Dispossessed", Genre::ScienceFiction, Some(Genre::Fiction), writer.id).await?;
    assert_eq!(novel.genre, Genre::ScienceFiction);
    assert_eq!(novel.extra_genre, Some(Genre::Fiction));

    let found = book::Entity::find_by_id(novel.id).one(&db).await?.unwrap();
    assert_eq!(found, novel);

    // Clear the nullable column
    let mut am: book::ActiveModel = found.into();
    am.extra_genre = Set(None);
    let updated = am.update(&db).await?;
    assert_eq!(updated.extra_genre, None);

    let related = writer.find_related(book::Entity).all(&db).await?;
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].title, "The Dispossessed");

    book::Entity::delete_by_id(novel.id).exec(&db).await?;
    assert!(book::Entity::find_by_id(novel.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_genre_is_stored_as_snake_case() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = connect_in_memory().await?;
    let writer = author::create(&db, "Agatha", "Christie").await?;
    let novel = book::create(&db, "Curtain", Genre::Mystery, None, writer.id).await?;

    let json = serde_json::to_value(&novel)?;
    assert_eq!(json["genre"], "mystery");
    assert!(json["extra_genre"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_validation_rejects_blank_names() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = connect_in_memory().await?;
    assert!(matches!(author::create(&db, " ", "Doe").await, Err(ModelError::Validation(_))));
    assert!(matches!(flower::create(&db, "").await, Err(ModelError::Validation(_))));
    assert!(matches!(book::create(&db, "", Genre::Poetry, None, 1).await, Err(ModelError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn test_flower_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = connect_in_memory().await?;
    let rose = flower::create(&db, "Rose").await?;
    let found = flower::Entity::find_by_id(rose.id).one(&db).await?;
    assert_eq!(found.map(|f| f.title), Some("Rose".to_string()));

    flower::Entity::delete_by_id(rose.id).exec(&db).await?;
    assert!(flower::Entity::find_by_id(rose.id).one(&db).await?.is_none());
    Ok(())
}
