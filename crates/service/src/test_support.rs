#![cfg(test)]
use sea_orm::DatabaseConnection;

/// Fresh migrated in-memory database per test, so tests never share rows.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    models::db::connect_in_memory().await
}
