use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use tracing::info;

use models::{author, book};
use crate::crud;
use crate::errors::ServiceError;
use crate::pagination::{ListQuery, Page};
use crate::schemas::{AuthorCreate, AuthorResponse, AuthorUpdate};

/// List authors with pagination and ordering.
pub async fn list(db: &DatabaseConnection, query: &ListQuery) -> Result<Page<AuthorResponse>, ServiceError> {
    let page = crud::get_multi_with_total::<author::Entity, _>(db, query).await?;
    Ok(page.map(AuthorResponse::from))
}

/// Get author by id.
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<AuthorResponse, ServiceError> {
    Ok(crud::get_or_404::<author::Entity, _>(db, id).await?.into())
}

/// Create an author.
pub async fn create(db: &DatabaseConnection, input: AuthorCreate) -> Result<AuthorResponse, ServiceError> {
    author::validate_names(&input.first_name, &input.last_name)?;
    let am = author::ActiveModel {
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        ..Default::default()
    };
    Ok(crud::create::<author::Entity, _>(db, am).await?.into())
}

/// Apply the fields present in `input`.
pub async fn update(db: &DatabaseConnection, id: i32, input: AuthorUpdate) -> Result<AuthorResponse, ServiceError> {
    let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
    if blank(&input.first_name) || blank(&input.last_name) {
        return Err(ServiceError::Validation("author names must not be blank".into()));
    }
    let updated = crud::update::<author::Entity, _, _>(db, id, |am| {
        if let Some(f) = input.first_name { am.first_name = Set(f); }
        if let Some(l) = input.last_name { am.last_name = Set(l); }
    })
    .await?;
    Ok(updated.into())
}

/// Delete an author together with their books in one transaction.
pub async fn remove(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    crud::get_or_404::<author::Entity, _>(&txn, id).await?;
    let books = book::Entity::delete_many()
        .filter(book::Column::AuthorId.eq(id))
        .exec(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    crud::remove::<author::Entity, _>(&txn, id).await?;
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(event = "author_deleted", author_id = id, books_deleted = books.rows_affected);
    Ok(())
}
