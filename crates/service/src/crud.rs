//! Entity-agnostic repository over any SeaORM entity keyed by an `i32`.
//!
//! Every function takes a generic connection so the same code runs against a pool or
//! inside a transaction.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, EntityTrait, IdenStatic, IntoActiveModel,
    Iterable, PaginatorTrait, PrimaryKeyToColumn, PrimaryKeyTrait, QueryOrder, QuerySelect, Select,
};

use crate::errors::ServiceError;
use crate::pagination::{ListQuery, Page, SortKey};

/// Human-readable entity name used in not-found details and metrics labels.
pub trait Named {
    const NAME: &'static str;
}

impl Named for models::book::Entity {
    const NAME: &'static str = "Book";
}

impl Named for models::author::Entity {
    const NAME: &'static str = "Author";
}

impl Named for models::flower::Entity {
    const NAME: &'static str = "Flower";
}

fn metric_label<E: Named>() -> String { E::NAME.to_ascii_lowercase() }

/// Fetch a row by primary key.
pub async fn get_by_id<E, C>(db: &C, id: i32) -> Result<Option<E::Model>, ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    E::find_by_id(id).one(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

/// Fetch a row or fail with `NotFound`.
pub async fn get_or_404<E, C>(db: &C, id: i32) -> Result<E::Model, ServiceError>
where
    E: EntityTrait + Named,
    C: ConnectionTrait,
    i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    get_by_id::<E, C>(db, id).await?.ok_or_else(|| ServiceError::not_found(E::NAME, id))
}

fn apply_ordering<E: EntityTrait>(mut select: Select<E>, keys: &[SortKey]) -> Result<Select<E>, ServiceError> {
    if keys.is_empty() {
        for pk in E::PrimaryKey::iter() {
            select = select.order_by_asc(pk.into_column());
        }
        return Ok(select);
    }
    for key in keys {
        let column = E::Column::iter()
            .find(|c| IdenStatic::as_str(c) == key.column)
            .ok_or_else(|| ServiceError::Validation(format!("unknown sort column `{}`", key.column)))?;
        select = if key.descending { select.order_by_desc(column) } else { select.order_by_asc(column) };
    }
    Ok(select)
}

/// One page of rows ordered per `query`, plus the total row count ignoring skip/limit.
pub async fn get_multi_with_total<E, C>(db: &C, query: &ListQuery) -> Result<Page<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: Sync + 'static,
    C: ConnectionTrait,
{
    let (skip, limit) = query.normalize()?;
    let select = apply_ordering(E::find(), &query.sort_keys())?;
    let total_count = E::find().count(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let objects = select
        .offset(skip)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(Page { objects, total_count })
}

/// Insert a prepared active model.
pub async fn create<E, C>(db: &C, am: E::ActiveModel) -> Result<E::Model, ServiceError>
where
    E: EntityTrait + Named,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    C: ConnectionTrait,
{
    let created = am.insert(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    common::metrics::record_crud(&metric_label::<E>(), "create");
    Ok(created)
}

/// Load the row, let `apply` set the changed columns, then save it.
pub async fn update<E, C, F>(db: &C, id: i32, apply: F) -> Result<E::Model, ServiceError>
where
    E: EntityTrait + Named,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    C: ConnectionTrait,
    F: FnOnce(&mut E::ActiveModel),
    i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let current = get_or_404::<E, C>(db, id).await?;
    let mut am = current.clone().into_active_model();
    apply(&mut am);
    if !am.is_changed() {
        return Ok(current);
    }
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    common::metrics::record_crud(&metric_label::<E>(), "update");
    Ok(updated)
}

/// Delete by primary key; `NotFound` when no row matched.
pub async fn remove<E, C>(db: &C, id: i32) -> Result<(), ServiceError>
where
    E: EntityTrait + Named,
    C: ConnectionTrait,
    i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let res = E::delete_by_id(id).exec(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found(E::NAME, id));
    }
    common::metrics::record_crud(&metric_label::<E>(), "delete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::flower;
    use sea_orm::Set;

    async fn seed(db: &sea_orm::DatabaseConnection, titles: &[&str]) -> Result<(), anyhow::Error> {
        for t in titles {
            flower::create(db, t).await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn list_defaults_to_primary_key_order() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        seed(&db, &["Tulip", "Aster", "Rose"]).await?;

        let page = get_multi_with_total::<flower::Entity, _>(&db, &ListQuery::default()).await?;
        assert_eq!(page.total_count, 3);
        let titles: Vec<_> = page.objects.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["Tulip", "Aster", "Rose"]);
        Ok(())
    }

    #[tokio::test]
    async fn list_respects_skip_limit_and_order() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        seed(&db, &["Tulip", "Aster", "Rose", "Lily"]).await?;

        let q = ListQuery { skip: Some(1), limit: Some(2), order_by: Some("-title".into()), ..Default::default() };
        let page = get_multi_with_total::<flower::Entity, _>(&db, &q).await?;
        assert_eq!(page.total_count, 4);
        let titles: Vec<_> = page.objects.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["Rose", "Lily"]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_sort_column_is_rejected() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let q = ListQuery { order_by: Some("petals".into()), ..Default::default() };
        let err = get_multi_with_total::<flower::Entity, _>(&db, &q).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn update_and_remove_report_missing_rows() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let err = update::<flower::Entity, _, _>(&db, 42, |am| am.title = Set("x".into())).await.unwrap_err();
        assert_eq!(err.to_string(), "Flower with id=42 not found");
        let err = remove::<flower::Entity, _>(&db, 42).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let am = flower::ActiveModel { title: Set("Daisy".into()), ..Default::default() };
        let created = create::<flower::Entity, _>(&db, am).await?;
        let updated = update::<flower::Entity, _, _>(&db, created.id, |am| am.title = Set("Daisy II".into())).await?;
        assert_eq!(updated.title, "Daisy II");
        remove::<flower::Entity, _>(&db, created.id).await?;
        assert!(get_by_id::<flower::Entity, _>(&db, created.id).await?.is_none());
        Ok(())
    }
}
