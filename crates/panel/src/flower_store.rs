use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde_json::Value;

use admin::AdminError;
use models::errors::ModelError;
use service::errors::ServiceError;
use service::flower_service;
use service::pagination::ListQuery;
use service::schemas::{FlowerCreate, FlowerUpdate};

/// Flower table exposed to the admin as JSON objects.
#[derive(Clone)]
pub struct FlowerStore {
    db: DatabaseConnection,
}

impl FlowerStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn admin_error(e: ServiceError) -> AdminError {
    match e {
        ServiceError::NotFound(msg) => AdminError::NotFound(msg),
        ServiceError::Validation(msg) | ServiceError::Model(ModelError::Validation(msg)) => AdminError::BadRequest(msg),
        ServiceError::Db(msg) | ServiceError::Model(ModelError::Db(msg)) => AdminError::Internal(msg),
    }
}

fn to_value<T: serde::Serialize>(v: T) -> Result<Value, AdminError> {
    serde_json::to_value(v).map_err(|e| AdminError::Internal(e.to_string()))
}

fn parse_pk(pk: &str) -> Option<i32> { pk.trim().parse().ok() }

#[async_trait]
impl admin::ModelStore for FlowerStore {
    async fn list(&self, skip: u64, limit: u64, order_by: &str) -> Result<(Vec<Value>, u64), AdminError> {
        let query = ListQuery { skip: Some(skip), limit: Some(limit), order_by: Some(order_by.to_string()), ..Default::default() };
        let page = flower_service::list(&self.db, &query).await.map_err(admin_error)?;
        let rows = page.objects.into_iter().map(to_value).collect::<Result<Vec<_>, _>>()?;
        Ok((rows, page.total_count))
    }

    async fn get(&self, pk: &str) -> Result<Option<Value>, AdminError> {
        let Some(id) = parse_pk(pk) else { return Ok(None) };
        match flower_service::get(&self.db, id).await {
            Ok(f) => Ok(Some(to_value(f)?)),
            Err(ServiceError::NotFound(_)) => Ok(None),
            Err(e) => Err(admin_error(e)),
        }
    }

    async fn insert(&self, data: Value) -> Result<Value, AdminError> {
        let input: FlowerCreate = serde_json::from_value(data).map_err(|e| AdminError::BadRequest(e.to_string()))?;
        to_value(flower_service::create(&self.db, input).await.map_err(admin_error)?)
    }

    async fn update(&self, pk: &str, data: Value) -> Result<Value, AdminError> {
        let id = parse_pk(pk).ok_or_else(|| AdminError::NotFound(format!("Flower with id={pk} not found")))?;
        let input: FlowerUpdate = serde_json::from_value(data).map_err(|e| AdminError::BadRequest(e.to_string()))?;
        to_value(flower_service::update(&self.db, id, input).await.map_err(admin_error)?)
    }

    async fn delete(&self, pk: &str) -> Result<bool, AdminError> {
        let Some(id) = parse_pk(pk) else { return Ok(false) };
        match flower_service::remove(&self.db, id).await {
            Ok(()) => Ok(true),
            Err(ServiceError::NotFound(_)) => Ok(false),
            Err(e) => Err(admin_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin::ModelStore;
    use serde_json::json;

    #[tokio::test]
    async fn store_round_trips_through_flower_service() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let store = FlowerStore::new(models::db::connect_in_memory().await?);

        let rose = store.insert(json!({"title": "Rose"})).await?;
        store.insert(json!({"title": "Tulip"})).await?;
        let pk = rose["id"].to_string();

        let (rows, total) = store.list(0, 10, "-id").await?;
        assert_eq!(total, 2);
        assert_eq!(rows[0]["title"], "Tulip");

        let updated = store.update(&pk, json!({"title": "Red Rose"})).await?;
        assert_eq!(updated["title"], "Red Rose");

        assert!(matches!(store.insert(json!({"title": " "})).await, Err(AdminError::BadRequest(_))));
        assert!(store.get("abc").await?.is_none());
        assert!(store.delete(&pk).await?);
        assert!(!store.delete(&pk).await?);
        Ok(())
    }
}
