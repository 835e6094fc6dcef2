use sea_orm::{DatabaseConnection, Set};

use models::flower;
use crate::crud;
use crate::errors::ServiceError;
use crate::pagination::{ListQuery, Page};
use crate::schemas::{FlowerCreate, FlowerResponse, FlowerUpdate};

pub async fn list(db: &DatabaseConnection, query: &ListQuery) -> Result<Page<FlowerResponse>, ServiceError> {
    let page = crud::get_multi_with_total::<flower::Entity, _>(db, query).await?;
    Ok(page.map(FlowerResponse::from))
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<FlowerResponse, ServiceError> {
    Ok(crud::get_or_404::<flower::Entity, _>(db, id).await?.into())
}

pub async fn create(db: &DatabaseConnection, input: FlowerCreate) -> Result<FlowerResponse, ServiceError> {
    if input.title.trim().is_empty() { return Err(ServiceError::Validation("title required".into())); }
    let am = flower::ActiveModel { title: Set(input.title), ..Default::default() };
    Ok(crud::create::<flower::Entity, _>(db, am).await?.into())
}

pub async fn update(db: &DatabaseConnection, id: i32, input: FlowerUpdate) -> Result<FlowerResponse, ServiceError> {
    if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ServiceError::Validation("title required".into()));
    }
    let updated = crud::update::<flower::Entity, _, _>(db, id, |am| {
        if let Some(t) = input.title { am.title = Set(t); }
    })
    .await?;
    Ok(updated.into())
}

pub async fn remove(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    crud::remove::<flower::Entity, _>(db, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn flower_crud_service() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let f = create(&db, FlowerCreate { title: "Peony".into() }).await?;
        assert_eq!(get(&db, f.id).await?.title, "Peony");

        let untouched = update(&db, f.id, FlowerUpdate::default()).await?;
        assert_eq!(untouched, f);

        assert!(matches!(create(&db, FlowerCreate { title: " ".into() }).await, Err(ServiceError::Validation(_))));

        remove(&db, f.id).await?;
        assert!(matches!(get(&db, f.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
